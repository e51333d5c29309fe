use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use learnhub_auth::permissions;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_class).get(list_classes))
        .route("/join", post(join_class))
        .route("/:id", get(get_class))
        .route("/:id/students", get(list_students))
        .route("/:id/students/:student_id", delete(remove_student))
}

pub async fn create_class(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateClassRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_CREATE)?;
    let class = services.create_class(&principal, body)?;
    Ok((StatusCode::CREATED, Json(dto::class_to_json(&class))).into_response())
}

pub async fn list_classes(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_READ)?;
    let items: Vec<_> = services
        .list_classes(&principal)
        .iter()
        .map(dto::class_to_json)
        .collect();
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn join_class(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::JoinClassRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_JOIN)?;
    let (class, already_enrolled) = services.join_class(&principal, &body.code)?;

    let mut value = dto::class_to_json(&class);
    if let Some(obj) = value.as_object_mut() {
        obj.insert("already_enrolled".to_string(), already_enrolled.into());
    }
    Ok(Json(value).into_response())
}

pub async fn get_class(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_READ)?;
    let class = services.get_class(&principal, &id)?;
    Ok(Json(dto::class_to_json(&class)).into_response())
}

pub async fn list_students(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_MANAGE)?;
    let items = services.class_students(&principal, &id)?;
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn remove_student(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, student_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::CLASSES_MANAGE)?;
    services.remove_student(&principal, &id, &student_id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
