//! PostgreSQL-backed stores.
//!
//! The pool is constructed once by the composition root and injected into
//! each store; every query is plain parameterized SQL through sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::HeaderMap;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use admindeck_auth::{
    session_token, AuthUser, Role, SessionBundle, SessionLookup, SessionRecord, SessionStoreError,
};
use admindeck_core::{PostId, SessionId, TestId, UserId};

use crate::stores::{
    NewPost, NewTest, PostChanges, PostRecord, PostStore, StoreError, TestChanges, TestRecord,
    TestStore, UserStore,
};

/// Open a connection pool against `database_url`.
///
/// Owned by the caller; lifecycle is tied to the process, not to a global.
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StoreError> {
    Ok(PgPool::connect(database_url).await?)
}

/// Apply the bundled schema (idempotent `CREATE IF NOT EXISTS` statements).
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(include_str!("../schema.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

fn session_from_row(row: &PgRow, user_id: UserId) -> Result<SessionRecord, sqlx::Error> {
    Ok(SessionRecord {
        id: SessionId::from_uuid(row.try_get::<Uuid, _>("session_id")?),
        token: row.try_get("token")?,
        user_id,
        expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<AuthUser, sqlx::Error> {
    let role: Option<String> = row.try_get("role")?;
    Ok(AuthUser {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        roles: Role::split_list(role.as_deref().unwrap_or_default()),
        banned: row.try_get("banned")?,
    })
}

/// Session and user lookup against the `sessions`/`users` tables.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionLookup for PostgresIdentityStore {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionBundle>, SessionStoreError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT
                s.id AS session_id,
                s.token,
                s.user_id,
                s.expires_at,
                s.created_at,
                u.name,
                u.email,
                u.role,
                u.banned
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(&token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionStoreError::backend(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = user_from_row(&row).map_err(|e| SessionStoreError::backend(e.to_string()))?;
        if user.banned {
            tracing::debug!(user_id = %user.id, "rejected session of banned user");
            return Ok(None);
        }

        let session = session_from_row(&row, user.id)
            .map_err(|e| SessionStoreError::backend(e.to_string()))?;

        Ok(Some(SessionBundle { user, session }))
    }
}

#[async_trait]
impl UserStore for PostgresIdentityStore {
    async fn list_all(&self) -> Result<Vec<AuthUser>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id AS user_id, name, email, role, banned
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(StoreError::from))
            .collect()
    }
}

fn post_from_row(row: &PgRow) -> Result<PostRecord, sqlx::Error> {
    Ok(PostRecord {
        id: PostId::from_uuid(row.try_get::<Uuid, _>("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Post CRUD against the `posts` table.
pub struct PostgresPostStore {
    pool: PgPool,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PostgresPostStore {
    async fn list_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| post_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn create(&self, new: NewPost) -> Result<PostRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(PostId::new().as_uuid())
        .bind(&new.title)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(post_from_row(&row)?)
    }

    async fn update(&self, changes: PostChanges) -> Result<Option<PostRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(changes.id.as_uuid())
        .bind(&changes.title)
        .bind(&changes.description)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose().map_err(StoreError::from)
    }

    async fn delete(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(post_from_row).transpose().map_err(StoreError::from)
    }
}

fn test_from_row(row: &PgRow) -> Result<TestRecord, sqlx::Error> {
    Ok(TestRecord {
        id: TestId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Test-record CRUD against the `tests` table.
pub struct PostgresTestStore {
    pool: PgPool,
}

impl PostgresTestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestStore for PostgresTestStore {
    async fn list_all(&self) -> Result<Vec<TestRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM tests
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| test_from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn create(&self, new: NewTest) -> Result<TestRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tests (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(TestId::new().as_uuid())
        .bind(&new.name)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(test_from_row(&row)?)
    }

    async fn update(&self, changes: TestChanges) -> Result<Option<TestRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE tests
            SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(changes.id.as_uuid())
        .bind(&changes.name)
        .bind(&changes.description)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(test_from_row).transpose().map_err(StoreError::from)
    }

    async fn delete(&self, id: TestId) -> Result<Option<TestRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            DELETE FROM tests
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(test_from_row).transpose().map_err(StoreError::from)
    }
}
