//! Dev/demo data seeding.
//!
//! Used by the `seed` binary: recreates the two demo accounts with fresh
//! session tokens and refills the posts table with generated content.

use chrono::{Duration, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use admindeck_auth::{AuthUser, Role};
use admindeck_core::{PostId, SessionId, UserId};

use crate::stores::StoreError;

/// How long seeded sessions stay valid.
const SESSION_TTL_DAYS: i64 = 7;

/// Insert batch size for generated posts.
const POST_BATCH_SIZE: usize = 100;

const DEMO_ACCOUNTS: &[(&str, &str, &str)] = &[
    ("User 1", "user1@email.com", "user"),
    ("Admin", "admin@email.com", "admin"),
];

const POST_TITLES: &[&str] = &[
    "Getting Started with the Dashboard",
    "Understanding Role-Based Access",
    "Session Management Basics",
    "Building Scalable Web Services",
    "Introduction to Database Design",
    "API Development Patterns",
    "Modern Deployment Strategies",
    "Monitoring and Logging",
    "Error Handling Patterns",
    "Authentication Strategies",
    "Testing Backend Services",
    "Working with Databases",
];

const POST_DESCRIPTIONS: &[&str] = &[
    "A comprehensive guide to building modern services with the latest technologies and best practices.",
    "Learn how to effectively use this feature to improve your development workflow.",
    "Explore proven techniques and patterns that will help you write more maintainable code.",
    "Everything you need to know to get started, from basics to advanced topics.",
    "Common pitfalls and how to avoid them in your next project.",
    "A detailed walkthrough with examples and use cases for everyday development.",
    "Step-by-step tutorial for implementing this feature in your application.",
    "Learn from real-world examples and case studies in production environments.",
];

/// A seeded demo account together with its freshly minted session token.
#[derive(Debug, Clone)]
pub struct SeededAccount {
    pub user: AuthUser,
    pub token: String,
}

/// Generate an opaque session token.
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Delete and recreate the demo accounts, each with one active session.
///
/// Existing sessions of the deleted accounts go with them (FK cascade).
pub async fn reset_demo_accounts(pool: &PgPool) -> Result<Vec<SeededAccount>, StoreError> {
    let emails: Vec<&str> = DEMO_ACCOUNTS.iter().map(|(_, email, _)| *email).collect();
    sqlx::query("DELETE FROM users WHERE email = ANY($1)")
        .bind(&emails)
        .execute(pool)
        .await?;

    let mut accounts = Vec::with_capacity(DEMO_ACCOUNTS.len());
    for (name, email, role) in DEMO_ACCOUNTS {
        let user_id = UserId::new();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(name)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await?;

        let token = generate_token();
        sqlx::query(
            r#"
            INSERT INTO sessions (id, token, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(SessionId::new().as_uuid())
        .bind(&token)
        .bind(user_id.as_uuid())
        .bind(Utc::now() + Duration::days(SESSION_TTL_DAYS))
        .execute(pool)
        .await?;

        tracing::info!(email = %email, role = %role, "seeded demo account");
        accounts.push(SeededAccount {
            user: AuthUser {
                id: user_id,
                name: name.to_string(),
                email: email.to_string(),
                roles: Role::split_list(role),
                banned: false,
            },
            token,
        });
    }

    Ok(accounts)
}

/// Delete all posts and insert `count` generated ones, in batches.
///
/// Content is generated deterministically by cycling the title and
/// description pools, so repeated seeding is reproducible.
pub async fn seed_posts(pool: &PgPool, count: usize) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM posts").execute(pool).await?;
    tracing::info!("deleted existing posts");

    let posts: Vec<(String, String)> = (0..count)
        .map(|i| {
            let base = POST_TITLES[i % POST_TITLES.len()];
            let round = i / POST_TITLES.len();
            let title = if round == 0 {
                base.to_string()
            } else {
                format!("{} (Part {})", base, round + 1)
            };
            let description = POST_DESCRIPTIONS[i % POST_DESCRIPTIONS.len()].to_string();
            (title, description)
        })
        .collect();

    for batch in posts.chunks(POST_BATCH_SIZE) {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("INSERT INTO posts (id, title, description) ");
        builder.push_values(batch, |mut row, (title, description)| {
            row.push_bind(*PostId::new().as_uuid())
                .push_bind(title)
                .push_bind(description);
        });
        builder.build().execute(pool).await?;
    }

    tracing::info!(count, "seeded posts");
    Ok(())
}
