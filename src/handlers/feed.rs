// Feed endpoints: posts of one user and the home feed (followed users
// plus the viewer), both paginated with opaque cursors.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use futures_util::future::try_join_all;
use serde::Deserialize;

use crate::{
    app::AppState,
    db::Page,
    middleware::AuthenticatedUser,
    models::Post,
    utils::{
        cursor::{decode_last_key, encode_last_key},
        ok_payload,
        service_error::ApiError,
        PaginatedResponse,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub last_key: Option<String>,
}

async fn feed_response(state: &AppState, page: Page<Post>) -> Result<Response, ApiError> {
    let data = try_join_all(page.items.into_iter().map(|mut post| async move {
        if let Some(image) = &post.image {
            post.image = Some(
                state
                    .blobs
                    .image_url(&state.config.post_bucket, image)
                    .await?,
            );
        }
        Ok::<_, ApiError>(post)
    }))
    .await?;

    Ok(ok_payload(&PaginatedResponse {
        count: data.len(),
        last_key: page.last_key.as_ref().map(encode_last_key),
        data,
    }))
}

/// GET /v1/feed/{userId}?lastKey= - one user's posts, newest first.
pub async fn by_user(
    State(state): State<AppState>,
    _viewer: AuthenticatedUser,
    Path(user_id): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Response, ApiError> {
    state
        .users
        .get(&user_id)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar feed do usuário"))?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    let start_key = params
        .last_key
        .as_deref()
        .map(decode_last_key)
        .transpose()?;

    let page = state
        .posts
        .query_by_user(&user_id, start_key, state.config.feed_page_size)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar feed do usuário"))?;

    feed_response(&state, page).await
}

/// GET /v1/feed?lastKey= - posts of everyone the viewer follows, plus
/// their own.
pub async fn home(
    State(state): State<AppState>,
    viewer: AuthenticatedUser,
    Query(params): Query<FeedParams>,
) -> Result<Response, ApiError> {
    let user = state
        .users
        .get(&viewer.user_id)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar feed da home"))?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    let mut user_ids = user.following.clone();
    user_ids.push(user.cognito_id.clone());

    let start_key = params
        .last_key
        .as_deref()
        .map(decode_last_key)
        .transpose()?;

    let page = state
        .posts
        .scan_by_users(&user_ids, start_key, state.config.feed_page_size)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar feed da home"))?;

    feed_response(&state, page).await
}
