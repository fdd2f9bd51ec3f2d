//! In-memory stores for tests and development.
//!
//! These mirror the Postgres implementations closely enough that the HTTP
//! layer cannot tell them apart: expiry, ban checks, and role splitting all
//! behave identically.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use http::HeaderMap;

use admindeck_auth::{
    session_token, AuthUser, SessionBundle, SessionLookup, SessionRecord, SessionStoreError,
};
use admindeck_core::{PostId, TestId, UserId};

use crate::stores::{
    NewPost, NewTest, PostChanges, PostRecord, PostStore, StoreError, TestChanges, TestRecord,
    TestStore, UserStore,
};

/// In-memory identity store: users plus their sessions, keyed by token.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<UserId, AuthUser>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: AuthUser) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }

    pub fn insert_session(&self, session: SessionRecord) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session.token.clone(), session);
        }
    }
}

#[async_trait]
impl SessionLookup for InMemoryIdentityStore {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionBundle>, SessionStoreError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let session = {
            let sessions = self
                .sessions
                .read()
                .map_err(|_| SessionStoreError::backend("session map poisoned"))?;
            sessions.get(&token).cloned()
        };

        let Some(session) = session else {
            return Ok(None);
        };
        if session.is_expired(Utc::now()) {
            return Ok(None);
        }

        let user = {
            let users = self
                .users
                .read()
                .map_err(|_| SessionStoreError::backend("user map poisoned"))?;
            users.get(&session.user_id).cloned()
        };

        match user {
            Some(user) if !user.banned => Ok(Some(SessionBundle { user, session })),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryIdentityStore {
    async fn list_all(&self) -> Result<Vec<AuthUser>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::database("user map poisoned"))?;

        let mut all: Vec<AuthUser> = users.values().cloned().collect();
        all.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(all)
    }
}

/// In-memory post store.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    inner: RwLock<HashMap<PostId, PostRecord>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::database("post map poisoned"))?;

        let mut posts: Vec<PostRecord> = map.values().cloned().collect();
        posts.sort_by(|a, b| (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid())));
        Ok(posts)
    }

    async fn create(&self, new: NewPost) -> Result<PostRecord, StoreError> {
        let now = Utc::now();
        let post = PostRecord {
            id: PostId::new(),
            title: new.title,
            description: new.description,
            created_at: now,
            updated_at: now,
        };

        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("post map poisoned"))?;
        map.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, changes: PostChanges) -> Result<Option<PostRecord>, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("post map poisoned"))?;

        let Some(post) = map.get_mut(&changes.id) else {
            return Ok(None);
        };
        post.title = changes.title;
        post.description = changes.description;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("post map poisoned"))?;
        Ok(map.remove(&id))
    }
}

/// In-memory test-record store.
#[derive(Debug, Default)]
pub struct InMemoryTestStore {
    inner: RwLock<HashMap<TestId, TestRecord>>,
}

impl InMemoryTestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestStore for InMemoryTestStore {
    async fn list_all(&self) -> Result<Vec<TestRecord>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::database("test map poisoned"))?;

        let mut records: Vec<TestRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid())));
        Ok(records)
    }

    async fn create(&self, new: NewTest) -> Result<TestRecord, StoreError> {
        let now = Utc::now();
        let record = TestRecord {
            id: TestId::new(),
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
        };

        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("test map poisoned"))?;
        map.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, changes: TestChanges) -> Result<Option<TestRecord>, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("test map poisoned"))?;

        let Some(record) = map.get_mut(&changes.id) else {
            return Ok(None);
        };
        record.name = changes.name;
        record.description = changes.description;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: TestId) -> Result<Option<TestRecord>, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::database("test map poisoned"))?;
        Ok(map.remove(&id))
    }
}
