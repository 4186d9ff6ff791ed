// Application state shared across handlers

use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::{PostRepository, UserRepository},
    services::{BlobGateway, IdentityGateway, RelationshipService, TokenVerifier},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub identity: Arc<dyn IdentityGateway>,
    pub blobs: Arc<dyn BlobGateway>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    pub relationships: Arc<RelationshipService>,
}
