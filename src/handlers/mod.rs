// Request handlers, one module per endpoint group.

pub mod auth;
pub mod feed;
pub mod follow;
pub mod post;
pub mod user;

use axum::{
    routing::{get, post as post_method, put},
    Router,
};

use crate::app::AppState;

/// Public authentication routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post_method(auth::register))
        .route("/confirm-email", post_method(auth::confirm_email))
        .route("/forgot-password", post_method(auth::forgot_password))
        .route("/change-password", post_method(auth::change_password))
        .route("/login", post_method(auth::login))
}

/// Routes behind the authentication middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/user/me", get(user::me))
        .route("/user", put(user::update))
        .route("/user/search", get(user::search))
        .route("/post", post_method(post::create))
        .route("/post/{postId}/like", put(post::toggle_like))
        .route("/follow/{followId}", put(follow::toggle))
        .route("/feed", get(feed::home))
        .route("/feed/{userId}", get(feed::by_user))
}
