// Authentication middleware for protected routes: validates the bearer
// token through the configured TokenVerifier and injects the
// authenticated subject into request extensions.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;

/// The authenticated subject of a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => return unauthorized("Token de acesso não informado"),
    };
    let token = token.to_string();

    match state.token_verifier.verify(&token).await {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthenticatedUser { user_id });
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "token validation failed");
            unauthorized("Token de acesso inválido ou expirado")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

/// Extractor so handlers can take `AuthenticatedUser` directly.
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "Usuário logado não encontrado" })),
                )
            })
    }
}
