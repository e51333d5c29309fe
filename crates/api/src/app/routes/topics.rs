use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
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
        .route("/", get(list_topics))
        .route("/subjects", get(list_subjects))
        .route("/:id", get(get_topic))
        .route("/:id/quiz", post(submit_quiz))
}

pub async fn list_topics(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::TopicQuery>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::TOPICS_READ)?;
    let items = services.list_topics(query)?;
    Ok(Json(serde_json::json!({ "items": items })).into_response())
}

pub async fn list_subjects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::TOPICS_READ)?;
    Ok(Json(serde_json::json!({ "items": services.subjects() })).into_response())
}

pub async fn get_topic(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::TOPICS_READ)?;
    let (detail, completed) = services.topic_detail(&principal, &id)?;

    let mut value = serde_json::to_value(detail).map_err(anyhow::Error::from)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("completed".to_string(), completed.into());
    }
    Ok(Json(value).into_response())
}

pub async fn submit_quiz(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::QuizSubmissionRequest>,
) -> Result<Response, ApiError> {
    authz::require(&principal, &permissions::QUIZ_SUBMIT)?;
    let out = services.submit_quiz(&principal, &id, &body.answers)?;
    Ok(Json(out).into_response())
}
