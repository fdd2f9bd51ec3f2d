//! Session authorization guard.
//!
//! Given a header collection and an optional set of permitted roles, the
//! guard resolves whether a valid authenticated session exists and whether
//! its role set intersects the permitted set. Every failure is a returned
//! error value; the guard never panics.

use std::sync::Arc;

use http::HeaderMap;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::{Role, SessionBundle, SessionLookup, SessionStoreError};

/// Authorization failure.
///
/// The first three variants are the authorization taxonomy proper; `Store`
/// carries a failure of the lookup collaborator through to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// No valid session could be resolved from the headers.
    #[error("session not found")]
    SessionNotFound,

    /// A session was resolved but carries no roles while a role was required.
    #[error("role missing from session")]
    RoleMissing,

    /// The session's roles do not intersect the allowed set.
    #[error("not authorized")]
    NotAuthorized,

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Request-scoped memoization of the session lookup.
///
/// Create one per logical call scope and pass it to every guard invocation in
/// that scope: the external lookup then runs at most once no matter how many
/// role checks the call performs. Concurrent calls each carry their own cache
/// and never observe each other's result.
#[derive(Debug, Default)]
pub struct GuardCache {
    resolved: OnceCell<Result<Option<SessionBundle>, SessionStoreError>>,
}

impl GuardCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resolves and authorizes sessions against a [`SessionLookup`] collaborator.
#[derive(Clone)]
pub struct AuthGuard {
    store: Arc<dyn SessionLookup>,
}

impl AuthGuard {
    pub fn new(store: Arc<dyn SessionLookup>) -> Self {
        Self { store }
    }

    /// Authorize the caller identified by `headers`.
    ///
    /// With an empty `allowed_roles`, any authenticated session is accepted.
    /// With a non-empty set, the session's user must hold at least one of the
    /// listed roles. Headers are always passed explicitly; there is no
    /// ambient fallback.
    pub async fn authorize(
        &self,
        cache: &GuardCache,
        headers: &HeaderMap,
        allowed_roles: &[Role],
    ) -> Result<SessionBundle, GuardError> {
        let resolved = cache
            .resolved
            .get_or_init(|| async { self.store.resolve(headers).await })
            .await;

        let bundle = match resolved {
            Err(e) => return Err(GuardError::Store(e.clone())),
            Ok(None) => return Err(GuardError::SessionNotFound),
            Ok(Some(bundle)) => bundle,
        };

        if !allowed_roles.is_empty() {
            if bundle.user.roles.is_empty() {
                return Err(GuardError::RoleMissing);
            }

            let permitted = bundle.user.roles.iter().any(|r| allowed_roles.contains(r));
            if !permitted {
                return Err(GuardError::NotAuthorized);
            }
        }

        Ok(bundle.clone())
    }
}
