use async_trait::async_trait;
use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use thiserror::Error;

use crate::SessionBundle;

/// Cookie carrying the session token when no `Authorization` header is set.
pub const SESSION_COOKIE: &str = "session_token";

/// Failure of the session store itself (connectivity, malformed rows).
///
/// Kept separate from the guard's authorization taxonomy: a store failure is
/// an infrastructure problem, not an authorization decision.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store failure: {0}")]
    Backend(String),
}

impl SessionStoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Session-lookup collaborator.
///
/// Accepts the caller's header collection and resolves the session/user pair
/// it identifies, or `None` when the headers carry no valid session (missing
/// token, unknown token, expired session, banned user).
#[async_trait]
pub trait SessionLookup: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionBundle>, SessionStoreError>;
}

/// Extract the session token from a header collection.
///
/// `Authorization: Bearer <token>` wins over the `session_token` cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        return Some(token.to_string());
    }

    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next().unwrap_or_default();
            let token = parts.next().unwrap_or_default().trim();
            if name == SESSION_COOKIE && !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_token_is_extracted() {
        let map = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(session_token(&map).as_deref(), Some("abc123"));
    }

    #[test]
    fn cookie_token_is_extracted() {
        let map = headers(&[("cookie", "theme=dark; session_token=tok-1")]);
        assert_eq!(session_token(&map).as_deref(), Some("tok-1"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let map = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "session_token=from-cookie"),
        ]);
        assert_eq!(session_token(&map).as_deref(), Some("from-header"));
    }

    #[test]
    fn token_is_searched_across_multiple_cookie_headers() {
        let map = headers(&[
            ("cookie", "theme=dark"),
            ("cookie", "session_token=tok-2"),
        ]);
        assert_eq!(session_token(&map).as_deref(), Some("tok-2"));
    }

    #[test]
    fn empty_or_malformed_credentials_yield_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers(&[("authorization", "Bearer ")])), None);
        assert_eq!(session_token(&headers(&[("authorization", "Basic abc")])), None);
        assert_eq!(session_token(&headers(&[("cookie", "session_token=")])), None);
    }
}
