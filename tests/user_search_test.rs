// Profile retrieval, update and paginated user search.

use axum::http::StatusCode;

mod common;
use common::{bearer, setup_test_app, test_user};

#[tokio::test]
async fn me_returns_the_record_with_presigned_avatar() {
    let mut ana = test_user("a", "Ana");
    ana.avatar = Some("avatar-1.png".to_string());
    let app = setup_test_app(&[ana], &[]);

    let (status, body) = app.get("/v1/user/me", Some(&bearer("a"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cognitoId"], "a");
    assert_eq!(body["name"], "Ana");
    assert_eq!(
        body["avatar"],
        "https://cdn.test/avatars-test/avatar-1.png"
    );
}

#[tokio::test]
async fn update_changes_name_and_avatar() {
    let app = setup_test_app(&[test_user("a", "Ana")], &[]);

    let (status, body) = app
        .send_multipart(
            "PUT",
            "/v1/user",
            Some(&bearer("a")),
            &[("name", "Ana Clara")],
            &[("avatar", "nova.png", b"png bytes")],
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Usuário atualizado com sucesso!");

    let user = app.users.snapshot("a").unwrap();
    assert_eq!(user.name, "Ana Clara");
    assert!(user.avatar.unwrap().ends_with(".png"));
}

#[tokio::test]
async fn update_rejects_short_name() {
    let app = setup_test_app(&[test_user("a", "Ana")], &[]);

    let (status, body) = app
        .send_multipart("PUT", "/v1/user", Some(&bearer("a")), &[("name", "A")], &[])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nome inválido");
    assert_eq!(app.users.snapshot("a").unwrap().name, "Ana");
}

#[tokio::test]
async fn search_pages_by_five_without_repeats() {
    let seeds: Vec<_> = (0..7)
        .map(|i| test_user(&format!("sub-{}", i), &format!("Ana {}", i)))
        .collect();
    let app = setup_test_app(&seeds, &[]);

    let (status, first) = app
        .get("/v1/user/search?filter=Ana", Some(&bearer("sub-0")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 5);
    let cursor = first["lastKey"].as_str().expect("second page pending");

    let (status, second) = app
        .get(
            &format!("/v1/user/search?filter=Ana&lastKey={}", cursor),
            Some(&bearer("sub-0")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["count"], 2);
    assert!(second.get("lastKey").is_none());

    for item in second["data"].as_array().unwrap() {
        assert!(!first["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|u| u["cognitoId"] == item["cognitoId"]));
    }
}

#[tokio::test]
async fn search_requires_a_filter() {
    let app = setup_test_app(&[test_user("a", "Ana")], &[]);

    let (status, body) = app.get("/v1/user/search", Some(&bearer("a"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Filtro de busca inválido");
}

#[tokio::test]
async fn search_matches_by_name_contains() {
    let app = setup_test_app(
        &[test_user("a", "Ana Souza"), test_user("b", "Bruno Lima")],
        &[],
    );

    let (_, body) = app
        .get("/v1/user/search?filter=Souza", Some(&bearer("a")))
        .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["cognitoId"], "a");
}
