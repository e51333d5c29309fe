use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use learnhub_auth::permissions;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_progress))
        .route("/complete", post(complete_topic))
        .route("/leaderboard", get(get_leaderboard))
}

pub async fn get_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::PROGRESS_READ)?;
    Ok(Json(services.progress_view(&principal)).into_response())
}

pub async fn complete_topic(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CompleteTopicRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::PROGRESS_WRITE)?;
    let completion = services.complete_topic(&principal, body)?;
    Ok(Json(completion).into_response())
}

pub async fn get_leaderboard(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::LimitQuery>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::PROGRESS_READ)?;
    let items = services.leaderboard(query.limit);
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}
