// Follow/unfollow toggle endpoint.

use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    services::FollowOutcome,
    utils::{ok_message, service_error::ApiError},
};

/// PUT /v1/follow/{followId}
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(follow_id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state
        .relationships
        .toggle_follow(&user.user_id, &follow_id)
        .await
        .map_err(|e| e.context("Erro ao seguir/deixar de seguir usuário"))?;

    Ok(match outcome {
        FollowOutcome::Followed => ok_message("Usuário seguido com sucesso"),
        FollowOutcome::Unfollowed => ok_message("Usuário deixado de seguir com sucesso"),
    })
}
