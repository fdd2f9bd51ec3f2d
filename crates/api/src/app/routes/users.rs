//! User procedures: the caller's own identity plus the admin directory.

use std::sync::Arc;

use serde_json::{json, Value};

use admindeck_auth::Role;

use crate::app::services::AppServices;
use crate::context::RpcContext;
use crate::middleware::AuthPolicy;
use crate::rpc::{ApiRegistry, RpcError};

pub fn register(registry: &mut ApiRegistry) {
    registry.register("users/current", AuthPolicy::Strict, Vec::new(), current);
    registry.register(
        "users/list-all",
        AuthPolicy::Strict,
        vec![Role::new("admin")],
        list_all,
    );
}

async fn current(
    _services: Arc<AppServices>,
    ctx: RpcContext,
    _input: Value,
) -> Result<Value, RpcError> {
    let (user, session) = match (ctx.user, ctx.session) {
        (Some(user), Some(session)) => (user, session),
        _ => return Err(RpcError::unauthorized("session not found")),
    };

    Ok(json!({
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "roles": user.roles,
        },
        "session": {
            "id": session.id,
            "expires_at": session.expires_at,
        },
    }))
}

async fn list_all(
    services: Arc<AppServices>,
    _ctx: RpcContext,
    _input: Value,
) -> Result<Value, RpcError> {
    let users = services.users.list_all().await?;
    Ok(serde_json::to_value(users)?)
}
