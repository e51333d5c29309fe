//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the operations behind each endpoint, over the in-memory repositories
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{Extension, Router, http::HeaderValue, routing::get};
use chrono::{Duration, Utc};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use learnhub_auth::{Hs256Jwt, PasswordHasher};
use learnhub_infra::{Repositories, seed_demo_data, seed_topics};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let repos = Repositories::new();
    let hasher = PasswordHasher::new();

    seed_topics(&repos)?;
    if config.seed_demo_data {
        seed_demo_data(&repos, &hasher, Utc::now())?;
    }

    let ttl = Duration::try_hours(config.token_ttl_hours)
        .with_context(|| format!("token lifetime of {} hours is out of range", config.token_ttl_hours))?;
    let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()).with_ttl(ttl));
    let auth_state = middleware::AuthState {
        jwt: jwt.clone(),
        users: repos.users.clone(),
    };

    let services = Arc::new(services::AppServices::new(repos, jwt, hasher));

    // Protected routes: require a valid bearer token for a known user.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::public_router().merge(protected))
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)?),
        ))
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_token_lifetime_is_an_error() {
        let config = ApiConfig {
            token_ttl_hours: i64::MAX,
            seed_demo_data: false,
            ..ApiConfig::default()
        };
        assert!(build_app(&config).is_err());
    }

    #[test]
    fn cors_origins_must_be_header_values() {
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }
}
