//! RPC procedure registry and dispatch.
//!
//! Procedures are registered once at startup and reachable two ways: through
//! the single multiplexed HTTP endpoint (`/api/rpc/{procedure}`) and via
//! [`ApiRegistry::call`] for in-process invocation. Both paths run the same
//! middleware pipeline.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

use admindeck_auth::{GuardError, Role};
use admindeck_core::DomainError;
use admindeck_infra::StoreError;

use crate::app::errors::json_error;
use crate::app::services::AppServices;
use crate::context::RpcContext;
use crate::middleware::{attach_identity, AuthPolicy};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Structured procedure failure, mapped onto an HTTP status + JSON body.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl RpcError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "invalid_input",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<GuardError> for RpcError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::SessionNotFound | GuardError::RoleMissing => {
                Self::Unauthorized(err.to_string())
            }
            GuardError::NotAuthorized => Self::Forbidden(err.to_string()),
            GuardError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<DomainError> for RpcError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_) | DomainError::InvalidId(_) => {
                Self::BadRequest(err.to_string())
            }
            DomainError::NotFound => Self::NotFound(err.to_string()),
            DomainError::Unauthorized => Self::Unauthorized(err.to_string()),
        }
    }
}

impl From<StoreError> for RpcError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        json_error(self.status(), self.code(), self.to_string())
    }
}

type ProcedureFuture = Pin<Box<dyn Future<Output = Result<Value, RpcError>> + Send>>;
type ProcedureHandler =
    Arc<dyn Fn(Arc<AppServices>, RpcContext, Value) -> ProcedureFuture + Send + Sync>;

struct ProcedureDef {
    policy: AuthPolicy,
    required_roles: Vec<Role>,
    handler: ProcedureHandler,
}

/// Path → procedure map, built once by the composition root.
#[derive(Default)]
pub struct ApiRegistry {
    procedures: HashMap<String, ProcedureDef>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure under `path`.
    ///
    /// `required_roles` is enforced by the dispatcher after the context
    /// middleware, through the same request-scoped guard cache, so declaring
    /// roles never costs an extra session lookup.
    pub fn register<F, Fut>(
        &mut self,
        path: &str,
        policy: AuthPolicy,
        required_roles: Vec<Role>,
        handler: F,
    ) where
        F: Fn(Arc<AppServices>, RpcContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RpcError>> + Send + 'static,
    {
        let previous = self.procedures.insert(
            path.to_string(),
            ProcedureDef {
                policy,
                required_roles,
                handler: Arc::new(move |services, ctx, input| {
                    Box::pin(handler(services, ctx, input))
                }),
            },
        );
        debug_assert!(previous.is_none(), "duplicate procedure path: {path}");
    }

    /// Invoke a procedure through the full middleware pipeline.
    ///
    /// This is the in-process entry point; the HTTP dispatcher goes through
    /// it as well, so the two paths cannot drift apart.
    pub async fn call(
        &self,
        services: &Arc<AppServices>,
        path: &str,
        mut ctx: RpcContext,
        input: Value,
    ) -> Result<Value, RpcError> {
        let def = self
            .procedures
            .get(path)
            .ok_or_else(|| RpcError::not_found("Procedure not found"))?;

        attach_identity(&services.guard, &mut ctx, def.policy).await?;

        if !def.required_roles.is_empty() {
            let Some(headers) = ctx.headers.as_ref() else {
                return Err(RpcError::not_found("Missing request headers"));
            };
            services
                .guard
                .authorize(&ctx.auth_cache, headers, &def.required_roles)
                .await?;
        }

        (def.handler)(Arc::clone(services), ctx, input).await
    }
}

/// Shared state behind the RPC endpoint.
#[derive(Clone)]
pub struct RpcState {
    pub services: Arc<AppServices>,
    pub registry: Arc<ApiRegistry>,
}

/// The single multiplexed RPC entry point.
///
/// Registered for every verb; the handler itself accepts POST only and
/// answers 405 for the rest. Body and result encoding is JSON throughout.
pub async fn dispatch(
    State(state): State<RpcState>,
    Path(procedure): Path<String>,
    req: Request,
) -> Response {
    if req.method() != Method::POST {
        return json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Only POST method is allowed",
        );
    }

    let headers = req.headers().clone();

    let bytes = match to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                "Unable to read request body",
            );
        }
    };

    // An absent body is the "no input" case, not a parse error.
    let input: Value = if bytes.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) => {
                return json_error(StatusCode::BAD_REQUEST, "invalid_body", "Invalid JSON body");
            }
        }
    };

    let ctx = RpcContext::with_headers(headers);
    match state.registry.call(&state.services, &procedure, ctx, input).await {
        Ok(value) => (StatusCode::OK, axum::Json(value)).into_response(),
        Err(err) => err.into_response(),
    }
}
