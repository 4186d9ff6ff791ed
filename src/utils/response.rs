// Uniform JSON response envelope shared by every handler:
// success messages as {"msg": ...}, payloads as the raw JSON value.

use axum::{http::StatusCode, response::Response, Json};
use serde::Serialize;
use serde_json::json;

/// 200 with a `{"msg": ...}` body.
pub fn ok_message(message: &str) -> Response {
    use axum::response::IntoResponse;
    (StatusCode::OK, Json(json!({ "msg": message }))).into_response()
}

/// 200 with the serialized payload as the body.
pub fn ok_payload<T: Serialize>(payload: &T) -> Response {
    use axum::response::IntoResponse;
    (StatusCode::OK, Json(payload)).into_response()
}

/// Paginated list envelope: `{count, lastKey, data}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
    pub data: Vec<T>,
}
