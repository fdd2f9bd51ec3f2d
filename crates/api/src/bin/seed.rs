//! Dev seeding: demo accounts with fresh session tokens plus generated posts.

use admindeck_infra::{connect_pool, ensure_schema, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    admindeck_observability::init();

    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = connect_pool(&database_url).await?;
    ensure_schema(&pool).await?;

    let accounts = seed::reset_demo_accounts(&pool).await?;
    for account in &accounts {
        tracing::info!(
            email = %account.user.email,
            token = %account.token,
            "session token minted"
        );
    }

    seed::seed_posts(&pool, 1000).await?;
    tracing::info!("seeding complete");
    Ok(())
}
