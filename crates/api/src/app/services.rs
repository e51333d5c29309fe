//! Application services: the operations behind each route.
//!
//! Handlers check role permissions; everything that depends on stored state
//! (ownership, membership, uniqueness) is decided here.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value as JsonValue, json};

use learnhub_ai::{AiJob, AiResult, ExplainTopicJob, GenerateQuizJob, HintJob, RecommendTopicsJob};
use learnhub_auth::{Hs256Jwt, JwtIssuer, NewUser, PasswordHasher, Role, User, UserProfile, normalize_email};
use learnhub_classroom::{Assignment, Classroom, NewAssignment, generate_join_code, normalize_join_code};
use learnhub_core::{AssignmentId, ClassroomId, DomainError, TopicId, UserId};
use learnhub_infra::{Repositories, Store};
use learnhub_learning::{
    Completion, LeaderboardEntry, Progress, Topic, TopicDetail, TopicFilter, TopicSummary, grade_quiz,
    leaderboard,
};

use crate::app::dto::{self, AuthResponse, QuizSubmissionResponse};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// Attempts at drawing an unused join code before giving up.
const JOIN_CODE_ATTEMPTS: usize = 16;

#[derive(Clone)]
pub struct AppServices {
    repos: Repositories,
    jwt: Arc<Hs256Jwt>,
    hasher: PasswordHasher,
}

impl AppServices {
    pub fn new(repos: Repositories, jwt: Arc<Hs256Jwt>, hasher: PasswordHasher) -> Self {
        Self { repos, jwt, hasher }
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    // -------------------------
    // Accounts
    // -------------------------

    pub async fn register(&self, body: dto::RegisterRequest) -> Result<AuthResponse, ApiError> {
        let input = NewUser::validate(
            &body.name,
            &body.email,
            &body.password,
            body.role.unwrap_or_default(),
        )?;

        if self.find_user_by_email(&input.email).is_some() {
            return Err(DomainError::conflict("an account with this email already exists").into());
        }

        let hasher = self.hasher;
        let password = input.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = input.into_user(password_hash, Utc::now());
        let email = user.email.clone();
        let user_id = user.id;
        self.repos
            .users
            .insert_unless(user, &|existing: &User| existing.email == email)
            .map_err(|_| DomainError::conflict("an account with this email already exists"))?;
        self.repos.progress.insert(Progress::new(user_id));

        let user = self
            .repos
            .users
            .get(&user_id)
            .ok_or_else(|| DomainError::not_found("user"))?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "registered user");
        self.auth_response(&user)
    }

    pub async fn login(&self, body: dto::LoginRequest) -> Result<AuthResponse, ApiError> {
        let bad_credentials = || DomainError::unauthenticated("invalid email or password");

        let user = self
            .find_user_by_email(&normalize_email(&body.email))
            .ok_or_else(bad_credentials)?;

        let hasher = self.hasher;
        let phc = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&body.password, &phc)).await??;
        if !verified {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(bad_credentials().into());
        }

        self.auth_response(&user)
    }

    pub fn me(&self, principal: &PrincipalContext) -> Result<UserProfile, ApiError> {
        Ok(self.user(principal.user_id())?.public())
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponse, ApiError> {
        let token = self.jwt.issue(user.id, user.role, Utc::now())?;
        Ok(AuthResponse {
            token,
            user: user.public(),
        })
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.repos.users.find(&|u: &User| u.email == email)
    }

    fn user(&self, id: UserId) -> Result<User, DomainError> {
        self.repos.users.get(&id).ok_or_else(|| DomainError::not_found("user"))
    }

    // -------------------------
    // Topics & quizzes
    // -------------------------

    pub fn list_topics(&self, query: dto::TopicQuery) -> Result<Vec<TopicSummary>, ApiError> {
        let filter = TopicFilter {
            subject: query.subject.filter(|s| !s.trim().is_empty()),
            difficulty: query
                .difficulty
                .filter(|d| !d.trim().is_empty())
                .map(|d| d.parse())
                .transpose()?,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let topics = self.repos.topics.list();
        Ok(filter.apply(&topics).into_iter().map(Topic::summary).collect())
    }

    pub fn subjects(&self) -> Vec<String> {
        self.repos
            .topics
            .list()
            .into_iter()
            .map(|t| t.subject)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn topic_detail(&self, principal: &PrincipalContext, id: &str) -> Result<(TopicDetail, bool), ApiError> {
        let topic = self.topic(id)?;
        let completed = self
            .repos
            .progress
            .get(&principal.user_id())
            .is_some_and(|p| p.has_completed(&topic.id));
        Ok((topic.detail(), completed))
    }

    /// Grade a quiz attempt. A passing student attempt also completes the topic.
    pub fn submit_quiz(
        &self,
        principal: &PrincipalContext,
        id: &str,
        answers: &[usize],
    ) -> Result<QuizSubmissionResponse, ApiError> {
        let topic = self.topic(id)?;
        let grade = grade_quiz(&topic, answers)?;
        let now = Utc::now();
        let complete = grade.passed && principal.role() == Role::Student;

        let completion = self.with_progress(principal.user_id(), |progress| {
            progress.record_attempt();
            if complete {
                progress.complete_topic(&topic, grade.score, now).map(Some)
            } else {
                Ok(None)
            }
        })?;

        tracing::info!(
            user_id = %principal.user_id(),
            topic_id = %topic.id,
            score = grade.score,
            passed = grade.passed,
            "graded quiz"
        );
        Ok(QuizSubmissionResponse { grade, completion })
    }

    pub(crate) fn topic(&self, id: &str) -> Result<Topic, DomainError> {
        let id = TopicId::parse(id)?;
        self.repos.topics.get(&id).ok_or_else(|| DomainError::not_found("topic"))
    }

    // -------------------------
    // Progress
    // -------------------------

    pub fn progress_view(&self, principal: &PrincipalContext) -> JsonValue {
        let progress = self
            .repos
            .progress
            .get(&principal.user_id())
            .unwrap_or_else(|| Progress::new(principal.user_id()));

        dto::progress_to_json(&progress, |topic_id| {
            TopicId::parse(topic_id)
                .ok()
                .and_then(|id| self.repos.topics.get(&id))
                .map(|t| t.title)
        })
    }

    pub fn complete_topic(
        &self,
        principal: &PrincipalContext,
        body: dto::CompleteTopicRequest,
    ) -> Result<Completion, ApiError> {
        let topic = self.topic(&body.topic_id)?;
        let score = body.score.unwrap_or(100);
        let completion = self.with_progress(principal.user_id(), |progress| {
            progress.complete_topic(&topic, score, Utc::now())
        })?;
        tracing::info!(
            user_id = %principal.user_id(),
            topic_id = %topic.id,
            xp_earned = completion.xp_earned,
            "completed topic"
        );
        Ok(completion)
    }

    pub fn leaderboard(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        let students = self.repos.users.filter(&|u: &User| u.role == Role::Student);
        let rows: Vec<(String, Progress)> = students
            .into_iter()
            .map(|u| {
                let progress = self
                    .repos
                    .progress
                    .get(&u.id)
                    .unwrap_or_else(|| Progress::new(u.id));
                (u.name, progress)
            })
            .collect();

        leaderboard(rows.iter().map(|(name, p)| (name.as_str(), p)), limit)
    }

    /// Run `f` against the caller's progress, creating the record on first use.
    fn with_progress<R>(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut Progress) -> Result<R, DomainError>,
    ) -> Result<R, DomainError> {
        // Err only means the record already exists.
        self.repos
            .progress
            .insert_unless(Progress::new(user_id), &|p: &Progress| p.user_id == user_id)
            .ok();
        self.repos
            .progress
            .update(&user_id, f)
            .ok_or_else(|| DomainError::not_found("progress"))?
    }

    // -------------------------
    // Classes
    // -------------------------

    pub fn create_class(
        &self,
        principal: &PrincipalContext,
        body: dto::CreateClassRequest,
    ) -> Result<Classroom, ApiError> {
        let now = Utc::now();
        let mut rng = rand::thread_rng();

        for _ in 0..JOIN_CODE_ATTEMPTS {
            let code = generate_join_code(&mut rng);
            let class = Classroom::new(&body.name, body.subject.as_deref(), principal.user_id(), code, now)?;
            let code = class.join_code.clone();
            match self
                .repos
                .classrooms
                .insert_unless(class.clone(), &|c: &Classroom| c.join_code == code)
            {
                Ok(()) => {
                    tracing::info!(class_id = %class.id, teacher_id = %class.teacher_id, "created class");
                    return Ok(class);
                }
                Err(_) => tracing::debug!(code = %code, "join code collision, retrying"),
            }
        }

        Err(anyhow::anyhow!("could not allocate a unique join code").into())
    }

    pub fn list_classes(&self, principal: &PrincipalContext) -> Vec<Classroom> {
        let user_id = principal.user_id();
        self.repos.classrooms.filter(&|c: &Classroom| c.is_member(user_id))
    }

    /// Returns the class and whether the caller was already enrolled.
    pub fn join_class(&self, principal: &PrincipalContext, code: &str) -> Result<(Classroom, bool), ApiError> {
        let code = normalize_join_code(code);
        if code.is_empty() {
            return Err(DomainError::validation("join code is required").into());
        }
        let class_id = code_lookup(&self.repos, &code)?;
        let user_id = principal.user_id();

        let newly_enrolled = self
            .repos
            .classrooms
            .update(&class_id, |c: &mut Classroom| c.enroll(user_id))
            .ok_or_else(|| DomainError::not_found("class"))?;
        if newly_enrolled {
            tracing::info!(class_id = %class_id, student_id = %user_id, "student joined class");
        }

        Ok((self.class(&class_id)?, !newly_enrolled))
    }

    pub fn get_class(&self, principal: &PrincipalContext, id: &str) -> Result<Classroom, ApiError> {
        let class = self.class(&parse_class_id(id)?)?;
        if !class.is_member(principal.user_id()) {
            return Err(DomainError::forbidden("not a member of this class").into());
        }
        Ok(class)
    }

    pub fn class_students(&self, principal: &PrincipalContext, id: &str) -> Result<Vec<JsonValue>, ApiError> {
        let class = self.owned_class(principal, &parse_class_id(id)?)?;
        Ok(class
            .student_ids
            .iter()
            .filter_map(|sid| self.repos.users.get(sid))
            .map(|u| {
                let progress = self.repos.progress.get(&u.id);
                dto::student_to_json(&u, progress.as_ref())
            })
            .collect())
    }

    pub fn remove_student(&self, principal: &PrincipalContext, id: &str, student_id: &str) -> Result<(), ApiError> {
        let class = self.owned_class(principal, &parse_class_id(id)?)?;
        let student_id: UserId = student_id.parse()?;

        self.repos
            .classrooms
            .update(&class.id, |c: &mut Classroom| c.remove_student(student_id))
            .ok_or_else(|| DomainError::not_found("class"))??;
        tracing::info!(class_id = %class.id, student_id = %student_id, "removed student from class");
        Ok(())
    }

    fn class(&self, id: &ClassroomId) -> Result<Classroom, DomainError> {
        self.repos.classrooms.get(id).ok_or_else(|| DomainError::not_found("class"))
    }

    fn owned_class(&self, principal: &PrincipalContext, id: &ClassroomId) -> Result<Classroom, DomainError> {
        let class = self.class(id)?;
        if !class.is_teacher(principal.user_id()) {
            return Err(DomainError::forbidden("only the class teacher can do this"));
        }
        Ok(class)
    }

    // -------------------------
    // Assignments
    // -------------------------

    pub fn create_assignment(
        &self,
        principal: &PrincipalContext,
        body: dto::CreateAssignmentRequest,
    ) -> Result<JsonValue, ApiError> {
        let class = self.owned_class(principal, &parse_class_id(&body.class_id)?)?;
        let topic = self.topic(&body.topic_id)?;
        let now = Utc::now();

        let assignment = Assignment::new(
            NewAssignment {
                class_id: class.id,
                topic_id: topic.id.clone(),
                title: body.title,
                instructions: body.instructions,
                due_at: body.due_at,
            },
            &topic.title,
            principal.user_id(),
            now,
        )?;
        self.repos.assignments.insert(assignment.clone());

        tracing::info!(assignment_id = %assignment.id, class_id = %class.id, topic_id = %topic.id, "created assignment");
        Ok(dto::assignment_to_json(&assignment, &class, Some(&topic), principal, now))
    }

    pub fn list_assignments(
        &self,
        principal: &PrincipalContext,
        class_id: Option<&str>,
    ) -> Result<Vec<JsonValue>, ApiError> {
        let classes = match class_id.filter(|c| !c.trim().is_empty()) {
            Some(id) => vec![self.get_class(principal, id)?],
            None => self.list_classes(principal),
        };

        let now = Utc::now();
        let mut items = Vec::new();
        for class in &classes {
            let class_id = class.id;
            for assignment in self.repos.assignments.filter(&|a: &Assignment| a.class_id == class_id) {
                let topic = self.repos.topics.get(&assignment.topic_id);
                items.push(dto::assignment_to_json(&assignment, class, topic.as_ref(), principal, now));
            }
        }
        Ok(items)
    }

    pub fn get_assignment(&self, principal: &PrincipalContext, id: &str) -> Result<JsonValue, ApiError> {
        let assignment = self.assignment(&parse_assignment_id(id)?)?;
        let class = self.class(&assignment.class_id)?;
        if !class.is_member(principal.user_id()) {
            return Err(DomainError::forbidden("not a member of this class").into());
        }
        let topic = self.repos.topics.get(&assignment.topic_id);
        Ok(dto::assignment_to_json(&assignment, &class, topic.as_ref(), principal, Utc::now()))
    }

    /// Record a student's score. The assignment's topic is completed with the same score.
    pub fn submit_assignment(
        &self,
        principal: &PrincipalContext,
        id: &str,
        score: u32,
    ) -> Result<JsonValue, ApiError> {
        let assignment_id = parse_assignment_id(id)?;
        let assignment = self.assignment(&assignment_id)?;
        let class = self.class(&assignment.class_id)?;
        let student_id = principal.user_id();
        if !class.is_student(student_id) {
            return Err(DomainError::forbidden("not enrolled in this class").into());
        }

        let topic = self
            .repos
            .topics
            .get(&assignment.topic_id)
            .ok_or_else(|| DomainError::not_found("topic"))?;
        let now = Utc::now();

        let submission = self
            .repos
            .assignments
            .update(&assignment_id, |a: &mut Assignment| a.submit(student_id, score, now).cloned())
            .ok_or_else(|| DomainError::not_found("assignment"))??;
        let completion = self.with_progress(student_id, |progress| progress.complete_topic(&topic, score, now))?;

        tracing::info!(assignment_id = %assignment_id, student_id = %student_id, score, "submitted assignment");
        Ok(json!({
            "assignment_id": assignment_id,
            "submission": submission,
            "completion": completion,
        }))
    }

    fn assignment(&self, id: &AssignmentId) -> Result<Assignment, DomainError> {
        self.repos
            .assignments
            .get(id)
            .ok_or_else(|| DomainError::not_found("assignment"))
    }

    // -------------------------
    // Tutor
    // -------------------------

    pub fn explain(&self, body: dto::ExplainRequest) -> Result<AiResult, ApiError> {
        let topic = self.topic(&body.topic_id)?;
        run_job(&ExplainTopicJob::new(topic, body.question))
    }

    pub fn hint(&self, body: dto::HintRequest) -> Result<AiResult, ApiError> {
        let topic = self.topic(&body.topic_id)?;
        run_job(&HintJob::new(topic, body.question_id))
    }

    pub fn recommendations(&self, principal: &PrincipalContext, limit: Option<usize>) -> Result<AiResult, ApiError> {
        let progress = self
            .repos
            .progress
            .get(&principal.user_id())
            .unwrap_or_else(|| Progress::new(principal.user_id()));
        run_job(&RecommendTopicsJob::new(self.repos.topics.list(), progress, limit))
    }

    pub fn generate_quiz(&self, body: dto::GenerateQuizRequest) -> Result<AiResult, ApiError> {
        let topic = self.topic(&body.topic_id)?;
        run_job(&GenerateQuizJob::new(topic, body.count))
    }
}

fn run_job<J: AiJob>(job: &J) -> Result<AiResult, ApiError> {
    let result = job.run()?;
    tracing::debug!(kind = job.kind(), "tutor job finished");
    Ok(result)
}

fn code_lookup(repos: &Repositories, code: &str) -> Result<ClassroomId, DomainError> {
    repos
        .classrooms
        .find(&|c: &Classroom| c.join_code == code)
        .map(|c| c.id)
        .ok_or_else(|| DomainError::not_found("class"))
}

fn parse_class_id(id: &str) -> Result<ClassroomId, DomainError> {
    id.parse()
}

fn parse_assignment_id(id: &str) -> Result<AssignmentId, DomainError> {
    id.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnhub_infra::{DemoData, seed_demo_data, seed_topics};

    fn services() -> (AppServices, DemoData) {
        let repos = Repositories::new();
        seed_topics(&repos).unwrap();
        let demo = seed_demo_data(&repos, &PasswordHasher::new(), Utc::now()).unwrap();
        let jwt = Arc::new(Hs256Jwt::new(b"test-secret"));
        (AppServices::new(repos, jwt, PasswordHasher::new()), demo)
    }

    fn student(demo: &DemoData) -> PrincipalContext {
        PrincipalContext::new(demo.student_id, Role::Student)
    }

    fn teacher(demo: &DemoData) -> PrincipalContext {
        PrincipalContext::new(demo.teacher_id, Role::Teacher)
    }

    #[test]
    fn passing_quiz_completes_topic_for_students_only() {
        let (svc, demo) = services();
        let sam = PrincipalContext::new(demo.second_student_id, Role::Student);

        let out = svc.submit_quiz(&sam, "photosynthesis", &[0, 0, 0]).unwrap();
        assert_eq!(out.grade.total, 3);
        let progress = svc.repos().progress.get(&demo.second_student_id).unwrap();
        assert_eq!(progress.quiz_attempts, 1);
        assert_eq!(out.completion.is_some(), out.grade.passed);

        let t = teacher(&demo);
        let algebra = svc.topic("algebra-basics").unwrap();
        let answers: Vec<usize> = algebra.quiz.iter().map(|q| q.answer).collect();
        let out = svc.submit_quiz(&t, "algebra-basics", &answers).unwrap();
        assert!(out.grade.passed);
        assert!(out.completion.is_none());
    }

    #[test]
    fn missing_progress_is_created_once_and_then_kept() {
        let (svc, _) = services();
        let newcomer = PrincipalContext::new(UserId::new(), Role::Student);
        assert!(svc.repos().progress.get(&newcomer.user_id()).is_none());

        svc.submit_quiz(&newcomer, "recursion", &[0, 0, 0]).unwrap();
        svc.submit_quiz(&newcomer, "recursion", &[0, 0, 0]).unwrap();

        let progress = svc.repos().progress.get(&newcomer.user_id()).unwrap();
        assert_eq!(progress.quiz_attempts, 2);
    }

    #[test]
    fn leaderboard_ranks_students_only() {
        let (svc, demo) = services();
        let board = svc.leaderboard(None);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, demo.student_id);
        assert!(board.iter().all(|e| e.user_id != demo.teacher_id));
    }

    #[test]
    fn joining_twice_reports_already_enrolled() {
        let (svc, demo) = services();
        let sam = PrincipalContext::new(demo.second_student_id, Role::Student);

        let (class, already) = svc.join_class(&sam, " alg123 ").unwrap();
        assert_eq!(class.id, demo.class_id);
        assert!(!already);

        let (_, already) = svc.join_class(&sam, "ALG123").unwrap();
        assert!(already);

        let err = svc.join_class(&sam, "NOPE99").unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn only_the_owner_sees_the_roster() {
        let (svc, demo) = services();
        let class_id = demo.class_id.to_string();

        let roster = svc.class_students(&teacher(&demo), &class_id).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0]["xp"], 50);

        let err = svc.class_students(&student(&demo), &class_id).unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Forbidden(_))));
    }

    #[test]
    fn submitting_an_assignment_completes_its_topic() {
        let (svc, demo) = services();
        let sam = PrincipalContext::new(demo.second_student_id, Role::Student);
        let assignment_id = demo.assignment_id.to_string();

        let err = svc.submit_assignment(&sam, &assignment_id, 90).unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Forbidden(_))));

        svc.join_class(&sam, "ALG123").unwrap();
        let out = svc.submit_assignment(&sam, &assignment_id, 90).unwrap();
        assert_eq!(out["submission"]["score"], 90);
        assert_eq!(out["completion"]["xp_earned"], 50);

        let view = svc.get_assignment(&sam, &assignment_id).unwrap();
        assert_eq!(view["status"], "submitted");
        assert_eq!(view["my_score"], 90);
    }

    #[test]
    fn assignment_filter_on_foreign_class_is_forbidden() {
        let (svc, demo) = services();
        let sam = PrincipalContext::new(demo.second_student_id, Role::Student);
        let err = svc
            .list_assignments(&sam, Some(&demo.class_id.to_string()))
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(DomainError::Forbidden(_))));

        let items = svc.list_assignments(&teacher(&demo), None).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["student_count"], 1);
    }

    #[test]
    fn created_classes_get_unique_codes() {
        let (svc, demo) = services();
        let t = teacher(&demo);
        let a = svc
            .create_class(&t, dto::CreateClassRequest { name: "Biology".into(), subject: None })
            .unwrap();
        let b = svc
            .create_class(&t, dto::CreateClassRequest { name: "Physics".into(), subject: Some("Science".into()) })
            .unwrap();
        assert_ne!(a.join_code, b.join_code);
        assert_eq!(a.subject, "General");
        assert_eq!(svc.list_classes(&t).len(), 3);
    }
}
