use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

use admindeck_api::app::services::{AppServices, InMemoryHandles};
use admindeck_api::app::build_app;
use admindeck_auth::{AuthUser, Role, SessionRecord};
use admindeck_core::{SessionId, UserId};

struct TestServer {
    base_url: String,
    handles: InMemoryHandles,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build the app with the same router as prod, but in-memory stores
        // and an ephemeral port.
        let (services, handles) = AppServices::in_memory();
        let app = build_app(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handles,
            handle,
        }
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/api/rpc/{procedure}", self.base_url)
    }

    fn seed_account(&self, email: &str, roles: &str, token: &str, ttl_minutes: i64) -> UserId {
        let user_id = UserId::new();
        self.handles.identity.insert_user(AuthUser {
            id: user_id,
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            roles: Role::split_list(roles),
            banned: false,
        });

        let now = Utc::now();
        self.handles.identity.insert_session(SessionRecord {
            id: SessionId::new(),
            token: token.to_string(),
            user_id,
            expires_at: now + ChronoDuration::minutes(ttl_minutes),
            created_at: now,
        });
        user_id
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn post_procedures_require_authentication() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("posts/list-all"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "stale-token", -5);

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("posts/list-all"))
        .bearer_auth("stale-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guest_calls_reach_lenient_procedures() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("tests/list-all"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn post_lifecycle_create_update_delete() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);

    let client = reqwest::Client::new();

    // Create
    let res = client
        .post(srv.rpc_url("posts/create"))
        .bearer_auth("user-token")
        .json(&json!({ "title": "First post", "description": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["title"], "First post");
    // Empty descriptions are stored as null.
    assert!(created["description"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    // List
    let res = client
        .post(srv.rpc_url("posts/list-all"))
        .bearer_auth("user-token")
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    // Update
    let res = client
        .post(srv.rpc_url("posts/update"))
        .bearer_auth("user-token")
        .json(&json!({ "id": id, "title": "First post (edited)" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["title"], "First post (edited)");

    // Delete
    let res = client
        .post(srv.rpc_url("posts/delete"))
        .bearer_auth("user-token")
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let deleted: serde_json::Value = res.json().await.unwrap();
    assert_eq!(deleted["success"], true);
    assert_eq!(deleted["deleted_post"]["id"].as_str(), Some(id.as_str()));

    // Deleting again is a not-found error.
    let res = client
        .post(srv.rpc_url("posts/delete"))
        .bearer_auth("user-token")
        .json(&json!({ "id": id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_titles_are_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("posts/create"))
        .bearer_auth("user-token")
        .json(&json!({ "title": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_directory_requires_the_admin_role() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);
    srv.seed_account("admin@email.com", "admin,user", "admin-token", 10);

    let client = reqwest::Client::new();

    // A plain user holds no overlapping role.
    let res = client
        .post(srv.rpc_url("users/list-all"))
        .bearer_auth("user-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The admin sees the whole directory.
    let res = client
        .post(srv.rpc_url("users/list-all"))
        .bearer_auth("admin-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["email"].as_str())
        .collect();
    assert_eq!(emails, vec!["admin@email.com", "user1@email.com"]);
}

#[tokio::test]
async fn current_user_reflects_the_session() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("users/current"))
        .bearer_auth("user-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "user1@email.com");
    assert!(body["user"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "user"));
    assert!(body["session"]["expires_at"].is_string());
}

#[tokio::test]
async fn session_token_is_accepted_from_the_cookie() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "cookie-token", 10);

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("users/current"))
        .header("cookie", "theme=dark; session_token=cookie-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn only_post_is_allowed_on_the_rpc_endpoint() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);

    let client = reqwest::Client::new();
    for method in [reqwest::Method::GET, reqwest::Method::PUT, reqwest::Method::DELETE] {
        let res = client
            .request(method.clone(), srv.rpc_url("posts/list-all"))
            .bearer_auth("user-token")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[tokio::test]
async fn unknown_procedures_are_not_found() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("posts/nonexistent"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_bodies_are_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_account("user1@email.com", "user", "user-token", 10);

    let client = reqwest::Client::new();
    let res = client
        .post(srv.rpc_url("posts/create"))
        .bearer_auth("user-token")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}
