// Profile endpoints: current user, profile update, user search.

use axum::{
    extract::{Multipart, Query, State},
    response::Response,
};
use futures_util::future::try_join_all;
use serde::Deserialize;

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::User,
    utils::{
        cursor::{decode_last_key, encode_last_key},
        forms::parse_form,
        is_allowed_image, ok_message, ok_payload,
        service_error::ApiError,
        PaginatedResponse,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub filter: Option<String>,
    pub last_key: Option<String>,
}

async fn resolve_avatar(state: &AppState, mut user: User) -> Result<User, ApiError> {
    if let Some(avatar) = &user.avatar {
        user.avatar = Some(
            state
                .blobs
                .image_url(&state.config.avatar_bucket, avatar)
                .await?,
        );
    }
    Ok(user)
}

/// GET /v1/user/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let record = state
        .users
        .get(&user.user_id)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar dados do usuário"))?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    let record = resolve_avatar(&state, record).await?;
    Ok(ok_payload(&record))
}

/// PUT /v1/user - multipart: optional name, optional avatar file.
pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut record = state
        .users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    let form = parse_form(&mut multipart).await?;

    if let Some(name) = form.text("name") {
        let name = name.trim();
        if name.chars().count() < 2 {
            return Err(ApiError::Validation("Nome inválido".to_string()));
        }
        record.name = name.to_string();
    }

    if let Some(avatar) = form.file("avatar") {
        if !is_allowed_image(&avatar.filename) {
            return Err(ApiError::Validation(
                "Extensão informada do arquivo não é válida".to_string(),
            ));
        }
        let key = state
            .blobs
            .save_image(
                &state.config.avatar_bucket,
                "avatar",
                &avatar.filename,
                avatar.content.to_vec(),
            )
            .await
            .map_err(|e| ApiError::from(e).context("Erro ao atualizar dados do usuário"))?;
        record.avatar = Some(key);
    }

    state
        .users
        .update(&record)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao atualizar dados do usuário"))?;

    Ok(ok_message("Usuário atualizado com sucesso!"))
}

/// GET /v1/user/search?filter=&lastKey= - paginated name search, page
/// size 5.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let filter = params
        .filter
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::Validation("Filtro de busca inválido".to_string()))?;

    let start_key = params
        .last_key
        .as_deref()
        .map(decode_last_key)
        .transpose()?;

    let page = state
        .users
        .search_by_name(filter, start_key, state.config.search_page_size)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao buscar usuários"))?;

    let data = try_join_all(
        page.items
            .into_iter()
            .map(|user| resolve_avatar(&state, user)),
    )
    .await?;

    Ok(ok_payload(&PaginatedResponse {
        count: data.len(),
        last_key: page.last_key.as_ref().map(encode_last_key),
        data,
    }))
}
