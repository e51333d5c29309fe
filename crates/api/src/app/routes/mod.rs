use axum::{
    Router,
    routing::{get, post},
};

pub mod ai;
pub mod assignments;
pub mod auth;
pub mod classes;
pub mod progress;
pub mod system;
pub mod topics;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Endpoints behind the bearer-token middleware.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/topics", topics::router())
        .nest("/progress", progress::router())
        .nest("/classes", classes::router())
        .nest("/assignments", assignments::router())
        .nest("/ai", ai::router())
}
