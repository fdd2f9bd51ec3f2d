//! RPC context middleware: resolve the caller's identity before the handler.

use admindeck_auth::AuthGuard;

use crate::context::RpcContext;
use crate::rpc::RpcError;

/// What to do when the guard cannot authenticate a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Fail closed: reject unauthenticated calls before any handler runs.
    /// The default for access-controlled procedures.
    Strict,

    /// Fail open: proceed with a null identity and let the handler decide.
    /// Only for procedures that serve guests and authenticated users alike.
    Lenient,
}

/// Resolve the caller's session and attach it to the call context.
///
/// Headers are mandatory: a context without them fails with a not-found
/// error regardless of policy. The guard runs with no role restriction here;
/// per-procedure role requirements are checked by the dispatcher against the
/// same request-scoped cache.
pub async fn attach_identity(
    guard: &AuthGuard,
    ctx: &mut RpcContext,
    policy: AuthPolicy,
) -> Result<(), RpcError> {
    let outcome = {
        let Some(headers) = ctx.headers.as_ref() else {
            return Err(RpcError::not_found("Missing request headers"));
        };
        guard.authorize(&ctx.auth_cache, headers, &[]).await
    };

    match outcome {
        Ok(bundle) => {
            ctx.user = Some(bundle.user);
            ctx.session = Some(bundle.session);
            Ok(())
        }
        Err(err) => match policy {
            AuthPolicy::Lenient => {
                tracing::debug!(error = %err, "proceeding with anonymous context");
                ctx.user = None;
                ctx.session = None;
                Ok(())
            }
            AuthPolicy::Strict => Err(RpcError::unauthorized(err.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use http::{HeaderMap, HeaderValue};

    use admindeck_auth::{AuthGuard, AuthUser, Role, SessionRecord};
    use admindeck_core::{SessionId, UserId};
    use admindeck_infra::InMemoryIdentityStore;

    use super::*;

    fn guard_with_session(token: &str) -> AuthGuard {
        let store = Arc::new(InMemoryIdentityStore::new());
        let user_id = UserId::new();
        store.insert_user(AuthUser {
            id: user_id,
            name: "User 1".to_string(),
            email: "user1@email.com".to_string(),
            roles: vec![Role::new("user")],
            banned: false,
        });
        let now = Utc::now();
        store.insert_session(SessionRecord {
            id: SessionId::new(),
            token: token.to_string(),
            user_id,
            expires_at: now + Duration::minutes(10),
            created_at: now,
        });
        AuthGuard::new(store)
    }

    fn empty_guard() -> AuthGuard {
        AuthGuard::new(Arc::new(InMemoryIdentityStore::new()))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn missing_headers_fail_under_both_policies() {
        let guard = empty_guard();

        for policy in [AuthPolicy::Strict, AuthPolicy::Lenient] {
            let mut ctx = RpcContext::new(None);
            let err = attach_identity(&guard, &mut ctx, policy).await.unwrap_err();
            assert!(matches!(err, RpcError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn lenient_policy_degrades_to_anonymous() {
        let guard = empty_guard();
        let mut ctx = RpcContext::with_headers(HeaderMap::new());

        attach_identity(&guard, &mut ctx, AuthPolicy::Lenient)
            .await
            .unwrap();

        assert!(ctx.user.is_none());
        assert!(ctx.session.is_none());
    }

    #[tokio::test]
    async fn strict_policy_rejects_unauthenticated_calls() {
        let guard = empty_guard();
        let mut ctx = RpcContext::with_headers(HeaderMap::new());

        let err = attach_identity(&guard, &mut ctx, AuthPolicy::Strict)
            .await
            .unwrap_err();

        assert!(matches!(err, RpcError::Unauthorized(_)));
        assert!(ctx.user.is_none());
    }

    #[tokio::test]
    async fn successful_guard_populates_identity() {
        let guard = guard_with_session("tok-1");
        let mut ctx = RpcContext::with_headers(bearer("tok-1"));

        attach_identity(&guard, &mut ctx, AuthPolicy::Strict)
            .await
            .unwrap();

        let user = ctx.user.as_ref().unwrap();
        assert_eq!(user.email, "user1@email.com");
        assert!(ctx.session.is_some());
    }
}
