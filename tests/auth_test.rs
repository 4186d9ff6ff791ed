// Registration, email confirmation, password recovery and login through
// the HTTP surface, against the mock identity gateway.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{setup_test_app, NEW_USER_SUB};

#[tokio::test]
async fn register_creates_user_record_with_provider_subject() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .send_multipart(
            "POST",
            "/v1/auth/register",
            None,
            &[
                ("email", "maria@example.com"),
                ("password", "Abcdef1!"),
                ("name", "Maria Silva"),
            ],
            &[("avatar", "perfil.png", b"fake png bytes")],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["msg"],
        "Usuario cadastrado com sucesso, verifique seu email para confirmar o codigo!"
    );
    assert_eq!(
        app.identity.recorded_calls(),
        vec!["sign_up:maria@example.com"]
    );

    let user = app.users.snapshot(NEW_USER_SUB).expect("record created");
    assert_eq!(user.name, "Maria Silva");
    assert_eq!(user.email, "maria@example.com");
    assert_eq!(user.followers, 0);
    assert_eq!(user.posts, 0);
    assert!(user.following.is_empty());
    let avatar = user.avatar.expect("avatar stored");
    assert!(avatar.starts_with("avatar-") && avatar.ends_with(".png"));
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .send_multipart(
            "POST",
            "/v1/auth/register",
            None,
            &[
                ("email", "nao-e-email"),
                ("password", "Abcdef1!"),
                ("name", "Maria"),
            ],
            &[],
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email inválido");
    assert!(app.identity.recorded_calls().is_empty());
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .send_multipart(
            "POST",
            "/v1/auth/register",
            None,
            &[
                ("email", "maria@example.com"),
                ("password", "abcdefgh"),
                ("name", "Maria"),
            ],
            &[],
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Senha inválida"));
}

#[tokio::test]
async fn register_rejects_disallowed_avatar_extension() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .send_multipart(
            "POST",
            "/v1/auth/register",
            None,
            &[
                ("email", "maria@example.com"),
                ("password", "Abcdef1!"),
                ("name", "Maria"),
            ],
            &[("avatar", "script.exe", b"MZ")],
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Extensão informada do arquivo não é válida");
    assert!(app.identity.recorded_calls().is_empty());
}

#[tokio::test]
async fn confirm_email_passes_code_through() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .post_json(
            "/v1/auth/confirm-email",
            &json!({"email": "maria@example.com", "code": "123456"}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Email confirmado com sucesso!");
    assert_eq!(
        app.identity.recorded_calls(),
        vec!["confirm_email:maria@example.com:123456"]
    );
}

#[tokio::test]
async fn confirm_email_rejects_short_code() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .post_json(
            "/v1/auth/confirm-email",
            &json!({"email": "maria@example.com", "code": "12345"}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Código de confirmação inválido");
}

#[tokio::test]
async fn missing_body_is_a_bad_request() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app.post_json("/v1/auth/login", &json!(null), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Parâmetros de entrada não informados");
}

#[tokio::test]
async fn login_returns_provider_tokens() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .post_json(
            "/v1/auth/login",
            &json!({"login": "maria@example.com", "password": "Abcdef1!"}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "maria@example.com");
    assert_eq!(body["token"], "access-token-test");
    assert_eq!(body["refreshToken"], "refresh-token-test");
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = setup_test_app(&[], &[]);

    let (status, body) = app
        .post_json(
            "/v1/auth/login",
            &json!({"login": "", "password": "Abcdef1!"}),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Parâmetros de entrada inválidos");
}

#[tokio::test]
async fn password_recovery_round_trip() {
    let app = setup_test_app(&[], &[]);

    let (status, _) = app
        .post_json(
            "/v1/auth/forgot-password",
            &json!({"email": "maria@example.com"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(
            "/v1/auth/change-password",
            &json!({"email": "maria@example.com", "code": "654321", "password": "Novasenha1!"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Senha alterada com sucesso!");

    assert_eq!(
        app.identity.recorded_calls(),
        vec![
            "forgot_password:maria@example.com",
            "change_password:maria@example.com:654321",
        ]
    );
}
