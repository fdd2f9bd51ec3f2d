use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

/// Consistent JSON error body: `{ "error": code, "message": .. }`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
