// Library exports for the social backend core.

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, ConfigError, Environment};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use models::{Post, User};
pub use services::{
    BlobGateway, FollowOutcome, IdentityGateway, LikeOutcome, RelationshipService, TokenVerifier,
};
pub use utils::ApiError;

/// Builds the full router: public auth routes, protected routes behind
/// the token middleware, plus the health endpoint.
pub fn build_router(state: AppState) -> Router {
    let protected = handlers::protected_routes().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/v1/auth", handlers::auth_routes())
        .nest("/v1", protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Wires the production gateways from the loaded configuration.
pub async fn initialize_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    use db::{DynamoClient, DynamoPostRepository, DynamoUserRepository};
    use services::{CognitoIdentityGateway, JwksTokenVerifier, S3BlobGateway};
    use utils::sigv4::Credentials;

    let http = reqwest::Client::new();
    let credentials = Credentials {
        access_key_id: config.aws_access_key_id.clone(),
        secret_access_key: config.aws_secret_access_key.clone(),
    };

    let dynamo = Arc::new(DynamoClient::new(
        http.clone(),
        &config.aws_region,
        credentials.clone(),
        config.dynamodb_endpoint.as_deref(),
    ));
    let users: Arc<dyn db::UserRepository> =
        Arc::new(DynamoUserRepository::new(dynamo.clone(), &config.user_table));
    let posts: Arc<dyn db::PostRepository> =
        Arc::new(DynamoPostRepository::new(dynamo, &config.post_table));

    let identity: Arc<dyn IdentityGateway> = Arc::new(CognitoIdentityGateway::new(
        http.clone(),
        &config.aws_region,
        &config.user_pool_client_id,
        config.cognito_endpoint.as_deref(),
    ));
    let blobs: Arc<dyn BlobGateway> = Arc::new(S3BlobGateway::new(
        http.clone(),
        &config.aws_region,
        credentials,
        config.presign_expiry_secs,
        config.s3_endpoint.as_deref(),
    ));

    let token_verifier: Arc<dyn TokenVerifier> = Arc::new(
        JwksTokenVerifier::discover(
            &http,
            &config.aws_region,
            &config.user_pool_id,
            &config.user_pool_client_id,
            config.token_issuer.as_deref(),
        )
        .await?,
    );

    let relationships = Arc::new(RelationshipService::new(users.clone(), posts.clone()));

    Ok(AppState {
        config: Arc::new(config),
        users,
        posts,
        identity,
        blobs,
        token_verifier,
        relationships,
    })
}

/// GET /health - liveness only; the external collaborators are checked
/// per request.
pub async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "service": "redesocial-core",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
