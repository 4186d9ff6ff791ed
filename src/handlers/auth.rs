// Authentication handlers: registration, email confirmation, password
// recovery and login. All delegate credential handling to the identity
// provider; only input validation happens here.

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    app::AppState,
    models::User,
    utils::{
        forms::parse_form,
        is_allowed_image, ok_message, ok_payload,
        service_error::ApiError,
        validation::{validate_confirmation_code, validate_password, EMAIL_REGEX},
    },
};

#[derive(Debug, Validate)]
pub struct RegisterRequest {
    #[validate(regex(path = "EMAIL_REGEX", message = "Email inválido"))]
    pub email: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    #[validate(length(min = 2, message = "Nome inválido"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmEmailRequest {
    #[validate(regex(path = "EMAIL_REGEX", message = "Email inválido"))]
    pub email: String,
    #[validate(custom = "validate_confirmation_code")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(regex(path = "EMAIL_REGEX", message = "Email inválido"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(regex(path = "EMAIL_REGEX", message = "Email inválido"))]
    pub email: String,
    #[validate(custom = "validate_confirmation_code")]
    pub code: String,
    #[validate(custom = "validate_password")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

fn require_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(request)| request)
        .map_err(|_| ApiError::Validation("Parâmetros de entrada não informados".to_string()))
}

/// POST /v1/auth/register - multipart: email, password, name and an
/// optional avatar file. Registers with the identity provider, stores
/// the avatar and creates the user record keyed by the subject id.
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = parse_form(&mut multipart).await?;
    let request = RegisterRequest {
        email: form.text("email").unwrap_or_default().trim().to_string(),
        password: form.text("password").unwrap_or_default().to_string(),
        name: form.text("name").unwrap_or_default().trim().to_string(),
    };
    request.validate()?;

    if let Some(avatar) = form.file("avatar") {
        if !is_allowed_image(&avatar.filename) {
            return Err(ApiError::Validation(
                "Extensão informada do arquivo não é válida".to_string(),
            ));
        }
    }

    let subject_id = state
        .identity
        .sign_up(&request.email, &request.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "sign up failed");
            ApiError::Upstream(
                "Erro ao cadastrar usuário! Tente novamente ou contate o administrador do sistema"
                    .to_string(),
            )
        })?;

    let avatar_key = match form.file("avatar") {
        Some(avatar) => Some(
            state
                .blobs
                .save_image(
                    &state.config.avatar_bucket,
                    "avatar",
                    &avatar.filename,
                    avatar.content.to_vec(),
                )
                .await
                .map_err(|e| ApiError::from(e).context("Erro ao salvar avatar do usuário"))?,
        ),
        None => None,
    };

    let user = User::new(subject_id, request.name, request.email, avatar_key);
    state
        .users
        .create(&user)
        .await
        .map_err(|e| ApiError::from(e).context("Erro ao cadastrar usuário"))?;

    Ok(ok_message(
        "Usuario cadastrado com sucesso, verifique seu email para confirmar o codigo!",
    ))
}

/// POST /v1/auth/confirm-email
pub async fn confirm_email(
    State(state): State<AppState>,
    body: Result<Json<ConfirmEmailRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = require_body(body)?;
    request.validate()?;

    state
        .identity
        .confirm_email(&request.email, &request.code)
        .await
        .map_err(|e| {
            ApiError::Upstream(format!("Erro ao confirmar email do usuário: {}", e))
        })?;

    Ok(ok_message("Email confirmado com sucesso!"))
}

/// POST /v1/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = require_body(body)?;
    request.validate()?;

    state.identity.forgot_password(&request.email).await.map_err(|e| {
        ApiError::Upstream(format!("Erro ao solicitar troca de senha do usuário: {}", e))
    })?;

    Ok(ok_message(
        "Solicitação de troca de senha enviada com sucesso, verifique seu email!",
    ))
}

/// POST /v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = require_body(body)?;
    request.validate()?;

    state
        .identity
        .change_password(&request.email, &request.password, &request.code)
        .await
        .map_err(|e| ApiError::Upstream(format!("Erro ao alterar senha do usuário: {}", e)))?;

    Ok(ok_message("Senha alterada com sucesso!"))
}

/// POST /v1/auth/login - returns `{email, token, refreshToken}`.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = require_body(body)?;
    if request.login.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Parâmetros de entrada inválidos".to_string(),
        ));
    }

    let tokens = state
        .identity
        .login(&request.login, &request.password)
        .await
        .map_err(|e| ApiError::Upstream(format!("Erro ao fazer login do usuário: {}", e)))?;

    Ok(ok_payload(&json!({
        "email": request.login,
        "token": tokens.access_token,
        "refreshToken": tokens.refresh_token,
    })))
}
