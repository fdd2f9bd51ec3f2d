use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use admindeck_core::{SessionId, UserId};

use crate::Role;

/// Authenticated user as seen by the authorization layer.
///
/// This is a read-only projection of state owned by the identity store;
/// nothing in this crate creates, mutates, or destroys users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub banned: bool,
}

/// Server-attested proof of an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The (user, session) pair produced by a successful lookup.
///
/// A session has exactly one owning user; the lookup returns them together so
/// callers never observe one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBundle {
    pub user: AuthUser,
    pub session: SessionRecord,
}
