//! Service wiring: the composition root owns every store and the guard.

use std::sync::Arc;

use sqlx::PgPool;

use admindeck_auth::AuthGuard;
use admindeck_infra::{
    connect_pool, InMemoryIdentityStore, InMemoryPostStore, InMemoryTestStore,
    PostStore, PostgresIdentityStore, PostgresPostStore, PostgresTestStore, TestStore, UserStore,
};

/// Everything the procedures need, behind trait objects so the HTTP layer is
/// indifferent to the store family.
pub struct AppServices {
    pub guard: AuthGuard,
    pub posts: Arc<dyn PostStore>,
    pub tests: Arc<dyn TestStore>,
    pub users: Arc<dyn UserStore>,
}

/// Concrete in-memory stores, exposed so tests can seed them directly.
pub struct InMemoryHandles {
    pub identity: Arc<InMemoryIdentityStore>,
    pub posts: Arc<InMemoryPostStore>,
    pub tests: Arc<InMemoryTestStore>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> (Self, InMemoryHandles) {
        let identity = Arc::new(InMemoryIdentityStore::new());
        let posts = Arc::new(InMemoryPostStore::new());
        let tests = Arc::new(InMemoryTestStore::new());

        let services = Self {
            guard: AuthGuard::new(identity.clone()),
            posts: posts.clone(),
            tests: tests.clone(),
            users: identity.clone(),
        };

        (
            services,
            InMemoryHandles {
                identity,
                posts,
                tests,
            },
        )
    }

    /// Postgres wiring; the pool is owned by the caller and injected here.
    pub fn postgres(pool: PgPool) -> Self {
        let identity = Arc::new(PostgresIdentityStore::new(pool.clone()));
        Self {
            guard: AuthGuard::new(identity.clone()),
            posts: Arc::new(PostgresPostStore::new(pool.clone())),
            tests: Arc::new(PostgresTestStore::new(pool)),
            users: identity,
        }
    }
}

/// Pick the store family from the environment.
pub async fn build_services() -> anyhow::Result<AppServices> {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            anyhow::anyhow!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")
        })?;
        let pool = connect_pool(&database_url).await?;
        Ok(AppServices::postgres(pool))
    } else {
        tracing::warn!("USE_PERSISTENT_STORES not enabled; using in-memory stores");
        Ok(AppServices::in_memory().0)
    }
}
