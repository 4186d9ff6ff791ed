// Crate-wide error type mapped to the JSON response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by handlers. Everything is caught at the handler
/// boundary and converted to the `{error: ...}` envelope; nothing
/// propagates uncaught.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required environment values are missing; the message enumerates them.
    #[error("ENVs para serviço não encontradas: {}", .0.join(", "))]
    Config(Vec<String>),

    /// Malformed or missing request input.
    #[error("{0}")]
    Validation(String),

    /// A referenced user or post does not exist. Reported to clients as
    /// a bad request, with the message naming what was missing.
    #[error("{0}")]
    NotFound(String),

    /// Identity provider, document store or blob store failure.
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first field message; the request structs carry
        // user-facing Portuguese messages on every rule.
        let msg = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Parâmetros de entrada inválidos".to_string());
        ApiError::Validation(msg)
    }
}

impl From<crate::db::StoreError> for ApiError {
    fn from(error: crate::db::StoreError) -> Self {
        ApiError::Upstream(error.to_string())
    }
}

impl From<crate::services::blob::BlobError> for ApiError {
    fn from(error: crate::services::blob::BlobError) -> Self {
        ApiError::Upstream(error.to_string())
    }
}

impl ApiError {
    /// Prefixes upstream failures with the endpoint's user-facing context,
    /// leaving validation and not-found messages untouched.
    pub fn context(self, prefix: &str) -> Self {
        match self {
            ApiError::Upstream(msg) => ApiError::Upstream(format!("{}: {}", prefix, msg)),
            other => other,
        }
    }
}
