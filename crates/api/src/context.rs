use http::HeaderMap;

use admindeck_auth::{AuthUser, GuardCache, SessionRecord};

/// Per-call context passed through the RPC pipeline.
///
/// The middleware populates `user`/`session`; handlers only read them. The
/// context is scoped to one in-flight call and never shared across calls.
pub struct RpcContext {
    /// Raw request headers; `None` for in-process calls that supplied none.
    pub headers: Option<HeaderMap>,

    pub user: Option<AuthUser>,
    pub session: Option<SessionRecord>,

    /// Guard memoization for this call: the session lookup runs at most once
    /// no matter how many role checks the call performs.
    pub auth_cache: GuardCache,
}

impl RpcContext {
    pub fn new(headers: Option<HeaderMap>) -> Self {
        Self {
            headers,
            user: None,
            session: None,
            auth_cache: GuardCache::new(),
        }
    }

    pub fn with_headers(headers: HeaderMap) -> Self {
        Self::new(Some(headers))
    }
}
