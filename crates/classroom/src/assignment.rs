use chrono::{DateTime, Utc};
use serde::Serialize;

use learnhub_core::{AssignmentId, ClassroomId, DomainError, DomainResult, Entity, TopicId, UserId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Overdue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub student_id: UserId,
    pub score: u32,
    pub submitted_at: DateTime<Utc>,
}

/// A topic assigned to a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub class_id: ClassroomId,
    pub topic_id: TopicId,
    pub title: String,
    pub instructions: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub submissions: Vec<Submission>,
}

impl Entity for Assignment {
    type Id = AssignmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an assignment.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub class_id: ClassroomId,
    pub topic_id: TopicId,
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// `topic_title` is used when no explicit title is given.
    pub fn new(
        input: NewAssignment,
        topic_title: &str,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if let Some(due) = input.due_at {
            if due <= now {
                return Err(DomainError::validation("due date must be in the future"));
            }
        }

        let title = input
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(topic_title)
            .to_string();

        let instructions = input
            .instructions
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());

        Ok(Self {
            id: AssignmentId::new(),
            class_id: input.class_id,
            topic_id: input.topic_id,
            title,
            instructions,
            due_at: input.due_at,
            created_by,
            created_at: now,
            submissions: Vec::new(),
        })
    }

    /// Record a student's score; a resubmission replaces the previous one.
    pub fn submit(&mut self, student_id: UserId, score: u32, now: DateTime<Utc>) -> DomainResult<&Submission> {
        if score > 100 {
            return Err(DomainError::validation("score must be between 0 and 100"));
        }

        self.submissions.retain(|s| s.student_id != student_id);
        self.submissions.push(Submission {
            student_id,
            score,
            submitted_at: now,
        });
        Ok(&self.submissions[self.submissions.len() - 1])
    }

    pub fn submission_for(&self, student_id: UserId) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.student_id == student_id)
    }

    pub fn status_for(&self, student_id: UserId, now: DateTime<Utc>) -> AssignmentStatus {
        if self.submission_for(student_id).is_some() {
            AssignmentStatus::Submitted
        } else if self.due_at.is_some_and(|due| due < now) {
            AssignmentStatus::Overdue
        } else {
            AssignmentStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(due_at: Option<DateTime<Utc>>) -> NewAssignment {
        NewAssignment {
            class_id: ClassroomId::new(),
            topic_id: TopicId::parse("algebra-basics").unwrap(),
            title: None,
            instructions: Some("  Finish the quiz.  ".to_string()),
            due_at,
        }
    }

    #[test]
    fn title_defaults_to_topic_title() {
        let a = Assignment::new(input(None), "Algebra Basics", UserId::new(), Utc::now()).unwrap();
        assert_eq!(a.title, "Algebra Basics");
        assert_eq!(a.instructions.as_deref(), Some("Finish the quiz."));

        let mut custom = input(None);
        custom.title = Some("Week 1 homework".to_string());
        let a = Assignment::new(custom, "Algebra Basics", UserId::new(), Utc::now()).unwrap();
        assert_eq!(a.title, "Week 1 homework");
    }

    #[test]
    fn due_date_must_be_in_the_future() {
        let now = Utc::now();
        let err = Assignment::new(input(Some(now - Duration::hours(1))), "T", UserId::new(), now).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn resubmission_replaces_previous_score() {
        let now = Utc::now();
        let mut a = Assignment::new(input(None), "T", UserId::new(), now).unwrap();
        let s = UserId::new();

        a.submit(s, 40, now).unwrap();
        a.submit(s, 90, now + Duration::minutes(5)).unwrap();

        assert_eq!(a.submissions.len(), 1);
        assert_eq!(a.submission_for(s).unwrap().score, 90);
        assert!(a.submit(s, 101, now).is_err());
        assert_eq!(a.submission_for(s).unwrap().score, 90);
    }

    #[test]
    fn status_tracks_submission_and_due_date() {
        let now = Utc::now();
        let due = now + Duration::days(1);
        let mut a = Assignment::new(input(Some(due)), "T", UserId::new(), now).unwrap();
        let s = UserId::new();

        assert_eq!(a.status_for(s, now), AssignmentStatus::Pending);
        assert_eq!(a.status_for(s, due + Duration::seconds(1)), AssignmentStatus::Overdue);

        a.submit(s, 70, due + Duration::hours(2)).unwrap();
        assert_eq!(a.status_for(s, due + Duration::hours(3)), AssignmentStatus::Submitted);
    }
}
