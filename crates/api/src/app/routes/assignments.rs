use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
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
        .route("/", post(create_assignment).get(list_assignments))
        .route("/:id", get(get_assignment))
        .route("/:id/submit", post(submit_assignment))
}

pub async fn create_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAssignmentRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::ASSIGNMENTS_CREATE)?;
    let view = services.create_assignment(&principal, body)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub async fn list_assignments(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::AssignmentQuery>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::ASSIGNMENTS_READ)?;
    let items = services.list_assignments(&principal, query.class_id.as_deref())?;
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn get_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::ASSIGNMENTS_READ)?;
    Ok(Json(services.get_assignment(&principal, &id)?).into_response())
}

pub async fn submit_assignment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SubmitAssignmentRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::ASSIGNMENTS_SUBMIT)?;
    let out = services.submit_assignment(&principal, &id, body.score)?;
    Ok(Json(out).into_response())
}
