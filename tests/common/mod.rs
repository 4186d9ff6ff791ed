// Common test utilities: an in-process app wired to in-memory
// repositories, a recording identity gateway and a static token
// verifier.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::util::ServiceExt;

use redesocial_core::{
    app::AppState,
    app_config::{AppConfig, Environment},
    build_router,
    db::{InMemoryPostRepository, InMemoryUserRepository},
    models::{Post, User},
    services::{
        identity::{AuthTokens, IdentityError, IdentityGateway},
        token::StaticTokenVerifier,
        BlobError, BlobGateway, RelationshipService,
    },
};

/// Subject id handed out by the mock gateway on sign up.
pub const NEW_USER_SUB: &str = "sub-new-user";

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        environment: Environment::Test,
        user_pool_id: "us-east-1_testpool".to_string(),
        user_pool_client_id: "test-client".to_string(),
        user_table: "users-test".to_string(),
        post_table: "posts-test".to_string(),
        avatar_bucket: "avatars-test".to_string(),
        post_bucket: "post-images-test".to_string(),
        aws_region: "us-east-1".to_string(),
        aws_access_key_id: "AKIDEXAMPLE".to_string(),
        aws_secret_access_key: "secret".to_string(),
        dynamodb_endpoint: None,
        cognito_endpoint: None,
        s3_endpoint: None,
        token_issuer: None,
        feed_page_size: 20,
        search_page_size: 5,
        presign_expiry_secs: 3600,
    }
}

/// Identity gateway double: records operations and succeeds.
#[derive(Default)]
pub struct MockIdentityGateway {
    pub calls: Mutex<Vec<String>>,
}

impl MockIdentityGateway {
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityGateway for MockIdentityGateway {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<String, IdentityError> {
        self.record(format!("sign_up:{}", email));
        Ok(NEW_USER_SUB.to_string())
    }

    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.record(format!("confirm_email:{}:{}", email, code));
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError> {
        self.record(format!("forgot_password:{}", email));
        Ok(())
    }

    async fn change_password(
        &self,
        email: &str,
        _new_password: &str,
        code: &str,
    ) -> Result<(), IdentityError> {
        self.record(format!("change_password:{}:{}", email, code));
        Ok(())
    }

    async fn login(&self, login: &str, _password: &str) -> Result<AuthTokens, IdentityError> {
        self.record(format!("login:{}", login));
        Ok(AuthTokens {
            access_token: "access-token-test".to_string(),
            refresh_token: "refresh-token-test".to_string(),
        })
    }
}

/// Blob gateway double: no uploads, deterministic keys and URLs.
#[derive(Default)]
pub struct MockBlobGateway {
    counter: Mutex<u32>,
}

#[async_trait]
impl BlobGateway for MockBlobGateway {
    async fn save_image(
        &self,
        _bucket: &str,
        prefix: &str,
        filename: &str,
        _content: Vec<u8>,
    ) -> Result<String, BlobError> {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        let extension = filename.rsplit('.').next().unwrap_or("bin").to_lowercase();
        Ok(format!("{}-{}.{}", prefix, counter, extension))
    }

    async fn image_url(&self, bucket: &str, key: &str) -> Result<String, BlobError> {
        Ok(format!("https://cdn.test/{}/{}", bucket, key))
    }
}

pub struct TestApp {
    router: Router,
    pub users: Arc<InMemoryUserRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub identity: Arc<MockIdentityGateway>,
}

/// Builds the app with every seeded user authenticated by the token
/// `token-{cognito_id}`.
pub fn setup_test_app(seed_users: &[User], seed_posts: &[Post]) -> TestApp {
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new());
    let identity = Arc::new(MockIdentityGateway::default());

    let mut verifier = StaticTokenVerifier::new();
    for user in seed_users {
        verifier = verifier.allow(&format!("token-{}", user.cognito_id), &user.cognito_id);
        users.seed(user.clone());
    }
    // a token for the account the mock gateway will register
    verifier = verifier.allow(&format!("token-{}", NEW_USER_SUB), NEW_USER_SUB);

    for post in seed_posts {
        posts.seed(post.clone());
    }

    let relationships = Arc::new(RelationshipService::new(users.clone(), posts.clone()));
    let state = AppState {
        config: Arc::new(test_config()),
        users: users.clone(),
        posts: posts.clone(),
        identity: identity.clone(),
        blobs: Arc::new(MockBlobGateway::default()),
        token_verifier: Arc::new(verifier),
        relationships,
    };

    TestApp {
        router: build_router(state),
        users,
        posts,
        identity,
    }
}

pub fn test_user(id: &str, name: &str) -> User {
    User::new(
        id.to_string(),
        name.to_string(),
        format!("{}@example.com", id),
        None,
    )
}

pub fn bearer(id: &str) -> String {
    format!("Bearer token-{}", id)
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("PUT").uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Sends a multipart request built by [`multipart_body`].
    pub async fn send_multipart(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> (StatusCode, Value) {
        let (content_type, body) = multipart_body(fields, files);
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type);
        if let Some(token) = token {
            builder = builder.header("authorization", token);
        }
        self.request(builder.body(Body::from(body)).unwrap()).await
    }
}

/// Hand-rolled multipart encoding for tests: text fields plus
/// `(field-name, filename, bytes)` uploads.
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "------------redesocial-test-boundary";
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("content-disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, filename, content) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "content-disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"content-type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}
