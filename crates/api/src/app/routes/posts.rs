//! Post CRUD procedures. Access-controlled: every call must be
//! authenticated (strict policy), deletion included.

use std::sync::Arc;

use serde_json::{json, Value};

use admindeck_infra::{NewPost, PostChanges};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::context::RpcContext;
use crate::middleware::AuthPolicy;
use crate::rpc::{ApiRegistry, RpcError};

pub fn register(registry: &mut ApiRegistry) {
    registry.register("posts/list-all", AuthPolicy::Strict, Vec::new(), list_all);
    registry.register("posts/create", AuthPolicy::Strict, Vec::new(), create);
    registry.register("posts/update", AuthPolicy::Strict, Vec::new(), update);
    registry.register("posts/delete", AuthPolicy::Strict, Vec::new(), delete);
}

async fn list_all(
    services: Arc<AppServices>,
    _ctx: RpcContext,
    _input: Value,
) -> Result<Value, RpcError> {
    let posts = services.posts.list_all().await?;
    Ok(serde_json::to_value(posts)?)
}

async fn create(
    services: Arc<AppServices>,
    _ctx: RpcContext,
    input: Value,
) -> Result<Value, RpcError> {
    let body: dto::CreatePostInput = dto::parse_input(input)?;
    body.validate()?;

    let post = services
        .posts
        .create(NewPost {
            title: body.title,
            description: dto::normalize_description(body.description),
        })
        .await?;

    Ok(serde_json::to_value(post)?)
}

async fn update(
    services: Arc<AppServices>,
    _ctx: RpcContext,
    input: Value,
) -> Result<Value, RpcError> {
    let body: dto::UpdatePostInput = dto::parse_input(input)?;
    body.validate()?;

    let post = services
        .posts
        .update(PostChanges {
            id: body.id,
            title: body.title,
            description: dto::normalize_description(body.description),
        })
        .await?
        .ok_or_else(|| RpcError::not_found("Post not found"))?;

    Ok(serde_json::to_value(post)?)
}

async fn delete(
    services: Arc<AppServices>,
    _ctx: RpcContext,
    input: Value,
) -> Result<Value, RpcError> {
    let body: dto::DeletePostInput = dto::parse_input(input)?;

    let post = services
        .posts
        .delete(body.id)
        .await?
        .ok_or_else(|| RpcError::not_found("Post not found"))?;

    Ok(json!({ "success": true, "deleted_post": post }))
}
