use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnhub_auth::{Role, User, UserProfile};
use learnhub_classroom::{Assignment, Classroom};
use learnhub_learning::{Completion, Progress, QuizGrade, Topic};

use crate::context::PrincipalContext;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmissionRequest {
    pub answers: Vec<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTopicRequest {
    pub topic_id: String,
    pub score: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinClassRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub class_id: String,
    pub topic_id: String,
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignmentQuery {
    pub class_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAssignmentRequest {
    pub score: u32,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub topic_id: String,
    pub question: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HintRequest {
    pub topic_id: String,
    pub question_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub topic_id: String,
    pub count: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct QuizSubmissionResponse {
    #[serde(flatten)]
    pub grade: QuizGrade,
    pub completion: Option<Completion>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn progress_to_json(progress: &Progress, topic_title: impl Fn(&str) -> Option<String>) -> serde_json::Value {
    let level = progress.level();
    let completed = progress
        .completed
        .iter()
        .map(|c| {
            serde_json::json!({
                "topic_id": c.topic_id,
                "title": topic_title(c.topic_id.as_str()),
                "best_score": c.best_score,
                "xp_earned": c.xp_earned,
                "completed_at": c.completed_at,
            })
        })
        .collect::<Vec<_>>();

    serde_json::json!({
        "user_id": progress.user_id,
        "xp": level.xp,
        "level": level.level,
        "xp_into_level": level.xp_into_level,
        "xp_to_next_level": level.xp_to_next_level,
        "quiz_attempts": progress.quiz_attempts,
        "completed_topics": completed,
    })
}

pub fn class_to_json(class: &Classroom) -> serde_json::Value {
    serde_json::json!({
        "id": class.id,
        "name": class.name,
        "subject": class.subject,
        "teacher_id": class.teacher_id,
        "join_code": class.join_code,
        "student_count": class.student_ids.len(),
        "created_at": class.created_at,
    })
}

pub fn student_to_json(user: &User, progress: Option<&Progress>) -> serde_json::Value {
    let xp = progress.map(|p| p.xp).unwrap_or(0);
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "xp": xp,
        "level": learnhub_learning::level_for_xp(xp),
        "completed_topics": progress.map(|p| p.completed.len()).unwrap_or(0),
    })
}

/// Assignment as seen by `viewer`: students get their own status and score,
/// the owning teacher gets submission counts.
pub fn assignment_to_json(
    assignment: &Assignment,
    class: &Classroom,
    topic: Option<&Topic>,
    viewer: &PrincipalContext,
    now: DateTime<Utc>,
) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": assignment.id,
        "class_id": assignment.class_id,
        "class_name": class.name,
        "topic_id": assignment.topic_id,
        "topic_title": topic.map(|t| t.title.clone()),
        "title": assignment.title,
        "instructions": assignment.instructions,
        "due_at": assignment.due_at,
        "created_at": assignment.created_at,
    });

    let extra = if class.is_teacher(viewer.user_id()) {
        serde_json::json!({
            "submission_count": assignment.submissions.len(),
            "student_count": class.student_ids.len(),
            "submissions": assignment.submissions,
        })
    } else {
        serde_json::json!({
            "status": assignment.status_for(viewer.user_id(), now),
            "my_score": assignment.submission_for(viewer.user_id()).map(|s| s.score),
        })
    };

    if let (Some(obj), serde_json::Value::Object(extra)) = (value.as_object_mut(), extra) {
        obj.extend(extra);
    }
    value
}
