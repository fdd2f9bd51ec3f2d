//! Store traits and record types for the dashboard's persisted resources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use admindeck_auth::AuthUser;
use admindeck_core::{PostId, TestId};

/// Infrastructure-level store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Database(String),
}

impl StoreError {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A post as stored and served to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: PostId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostChanges {
    pub id: PostId,
    pub title: String,
    pub description: Option<String>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first.
    async fn list_all(&self) -> Result<Vec<PostRecord>, StoreError>;

    async fn create(&self, new: NewPost) -> Result<PostRecord, StoreError>;

    /// Returns `None` when no post with the given id exists.
    async fn update(&self, changes: PostChanges) -> Result<Option<PostRecord>, StoreError>;

    /// Returns the deleted row, `None` when no post with the given id exists.
    async fn delete(&self, id: PostId) -> Result<Option<PostRecord>, StoreError>;
}

/// A test record; structurally a twin of [`PostRecord`] with `name` in place
/// of `title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: TestId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TestChanges {
    pub id: TestId,
    pub name: String,
    pub description: Option<String>,
}

#[async_trait]
pub trait TestStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<TestRecord>, StoreError>;

    async fn create(&self, new: NewTest) -> Result<TestRecord, StoreError>;

    async fn update(&self, changes: TestChanges) -> Result<Option<TestRecord>, StoreError>;

    async fn delete(&self, id: TestId) -> Result<Option<TestRecord>, StoreError>;
}

/// Read-only user directory for the admin views.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<AuthUser>, StoreError>;
}
