//! HTTP application wiring (axum router + service composition).
//!
//! Layout:
//! - `services.rs`: store wiring (in-memory or Postgres) and the guard
//! - `routes/`: RPC procedures, one file per resource
//! - `dto.rs`: input DTOs and validation
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::rpc::{self, RpcState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let registry = Arc::new(routes::build_registry());
    let state = RpcState { services, registry };

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/api/rpc/*procedure", any(rpc::dispatch))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
