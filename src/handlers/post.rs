// Post creation and like toggle endpoints.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
};

use crate::{
    app::AppState,
    middleware::AuthenticatedUser,
    models::Post,
    services::LikeOutcome,
    utils::{forms::parse_form, is_allowed_image, ok_message, service_error::ApiError},
};

/// POST /v1/post - multipart: description (min 5 chars) and image file.
pub async fn create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    state
        .users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    let form = parse_form(&mut multipart).await?;

    let description = form.text("description").unwrap_or_default().trim().to_string();
    if description.chars().count() < 5 {
        return Err(ApiError::Validation("Descrição inválida".to_string()));
    }

    let file = form
        .file("file")
        .filter(|file| is_allowed_image(&file.filename))
        .ok_or_else(|| {
            ApiError::Validation("Extensão informada do arquivo não é válida".to_string())
        })?;

    let image_key = state
        .blobs
        .save_image(
            &state.config.post_bucket,
            "post",
            &file.filename,
            file.content.to_vec(),
        )
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao criar publicação"))?;

    let post = Post::new(user.user_id.clone(), description, Some(image_key));
    state
        .posts
        .create(&post)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao criar publicação"))?;
    state
        .users
        .increment_posts(&user.user_id)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao criar publicação"))?;

    Ok(ok_message("Publicação criada com sucesso!"))
}

/// PUT /v1/post/{postId}/like
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = state
        .relationships
        .toggle_like(&user.user_id, &post_id)
        .await
        .map_err(|e| e.context("Erro ao curtir/descurtir a publicação"))?;

    Ok(match outcome {
        LikeOutcome::Added => ok_message("Like adicionado com sucesso!"),
        LikeOutcome::Removed => ok_message("Like removido com sucesso!"),
    })
}
