//! `admindeck-infra` — storage implementations behind the store traits.
//!
//! Two families are provided: PostgreSQL (sqlx) for real deployments and
//! in-memory stores for tests/dev. Connections are constructed explicitly by
//! the composition root and handed in; nothing here holds process-wide state.

pub mod memory;
pub mod postgres;
pub mod seed;
pub mod stores;

pub use memory::{InMemoryIdentityStore, InMemoryPostStore, InMemoryTestStore};
pub use postgres::{
    connect_pool, ensure_schema, PostgresIdentityStore, PostgresPostStore, PostgresTestStore,
};
pub use stores::{
    NewPost, NewTest, PostChanges, PostRecord, PostStore, StoreError, TestChanges, TestRecord,
    TestStore, UserStore,
};
