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
        .route("/explain", post(explain))
        .route("/hint", post(hint))
        .route("/recommendations", get(recommendations))
        .route("/generate-quiz", post(generate_quiz))
}

pub async fn explain(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ExplainRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::AI_USE)?;
    Ok(Json(services.explain(body)?).into_response())
}

pub async fn hint(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::HintRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::AI_USE)?;
    Ok(Json(services.hint(body)?).into_response())
}

pub async fn recommendations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::LimitQuery>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::AI_USE)?;
    Ok(Json(services.recommendations(&principal, query.limit)?).into_response())
}

pub async fn generate_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::GenerateQuizRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::AI_GENERATE_QUIZ)?;
    Ok(Json(services.generate_quiz(body)?).into_response())
}
