//! Demo data loaded at startup.
//!
//! The topic catalog is static content and is always loaded. Demo accounts,
//! a class, an assignment and some progress are optional.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};

use learnhub_auth::{NewUser, PasswordHasher, Role, User};
use learnhub_classroom::{Assignment, Classroom, NewAssignment};
use learnhub_core::{AssignmentId, ClassroomId, DomainResult, TopicId, UserId};
use learnhub_learning::{Difficulty, Progress, QuizQuestion, Topic};

use crate::Repositories;
use crate::store::Store;

pub const DEMO_PASSWORD: &str = "password123";
pub const DEMO_TEACHER_EMAIL: &str = "teacher@learnhub.dev";
pub const DEMO_STUDENT_EMAIL: &str = "student@learnhub.dev";
pub const DEMO_SECOND_STUDENT_EMAIL: &str = "sam@learnhub.dev";
pub const DEMO_JOIN_CODE: &str = "ALG123";

/// Identifiers of the seeded demo records.
#[derive(Debug, Clone, Copy)]
pub struct DemoData {
    pub teacher_id: UserId,
    pub student_id: UserId,
    pub second_student_id: UserId,
    pub class_id: ClassroomId,
    pub assignment_id: AssignmentId,
}

/// Load the topic catalog. Returns the number of topics loaded.
pub fn seed_topics(repos: &Repositories) -> anyhow::Result<usize> {
    let topics = catalog().context("building topic catalog")?;
    let count = topics.len();
    for topic in topics {
        repos.topics.insert(topic);
    }
    tracing::info!(count, "seeded topic catalog");
    Ok(count)
}

/// Load demo users, class, assignment and progress. Expects the catalog to be seeded.
pub fn seed_demo_data(repos: &Repositories, hasher: &PasswordHasher, now: DateTime<Utc>) -> anyhow::Result<DemoData> {
    let password_hash = hasher.hash(DEMO_PASSWORD).context("hashing demo password")?;

    let teacher = demo_user(repos, "Ms. Rivera", DEMO_TEACHER_EMAIL, Role::Teacher, &password_hash, now)?;
    let student = demo_user(repos, "Alex Kim", DEMO_STUDENT_EMAIL, Role::Student, &password_hash, now)?;
    let second = demo_user(repos, "Sam Patel", DEMO_SECOND_STUDENT_EMAIL, Role::Student, &password_hash, now)?;

    for user in [&teacher, &student, &second] {
        repos.progress.insert(Progress::new(user.id));
    }

    let mut class = Classroom::new(
        "Period 1 Algebra",
        Some("Mathematics"),
        teacher.id,
        DEMO_JOIN_CODE.to_string(),
        now,
    )?;
    class.enroll(student.id);
    let class_id = class.id;
    repos.classrooms.insert(class);

    let algebra = TopicId::parse("algebra-basics")?;
    let algebra_topic = repos
        .topics
        .get(&algebra)
        .context("topic catalog must be seeded before demo data")?;

    let assignment = Assignment::new(
        NewAssignment {
            class_id,
            topic_id: algebra.clone(),
            title: None,
            instructions: Some("Read the lesson, then pass the quiz.".to_string()),
            due_at: Some(now + Duration::days(7)),
        },
        &algebra_topic.title,
        teacher.id,
        now,
    )?;
    let assignment_id = assignment.id;
    repos.assignments.insert(assignment);

    repos
        .progress
        .update(&student.id, |p| p.complete_topic(&algebra_topic, 80, now))
        .context("demo student progress missing")??;

    tracing::info!(%class_id, "seeded demo accounts and classroom");

    Ok(DemoData {
        teacher_id: teacher.id,
        student_id: student.id,
        second_student_id: second.id,
        class_id,
        assignment_id,
    })
}

fn demo_user(
    repos: &Repositories,
    name: &str,
    email: &str,
    role: Role,
    password_hash: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<User> {
    let user = NewUser::validate(name, email, DEMO_PASSWORD, role)?.into_user(password_hash.to_string(), now);
    repos
        .users
        .insert_unless(user.clone(), &|u: &User| u.email == user.email)
        .map_err(|u| anyhow::anyhow!("demo user {} already exists", u.email))?;
    Ok(user)
}

fn q(id: u32, prompt: &str, options: &[&str], answer: usize, explanation: &str) -> DomainResult<QuizQuestion> {
    QuizQuestion::new(id, prompt, options, answer, explanation)
}

#[allow(clippy::too_many_arguments)]
fn topic(
    id: &str,
    title: &str,
    subject: &str,
    description: &str,
    difficulty: Difficulty,
    xp_reward: u32,
    estimated_minutes: u32,
    content: &str,
    quiz: Vec<QuizQuestion>,
    order: u32,
) -> DomainResult<Topic> {
    Ok(Topic {
        id: TopicId::parse(id)?,
        title: title.to_string(),
        subject: subject.to_string(),
        description: description.to_string(),
        difficulty,
        xp_reward,
        estimated_minutes,
        content: content.to_string(),
        quiz,
        order,
    })
}

fn catalog() -> DomainResult<Vec<Topic>> {
    Ok(vec![
        topic(
            "algebra-basics",
            "Algebra Basics",
            "Mathematics",
            "Variables, expressions and the idea of balancing an equation.",
            Difficulty::Beginner,
            50,
            20,
            "A variable is a letter that stands for an unknown number. An expression combines variables and numbers with operations, like 3x + 2. \
             To solve an equation, do the same operation to both sides until the variable stands alone. \
             For example, x + 5 = 12 becomes x = 7 after subtracting 5 from both sides.",
            vec![
                q(1, "What is x if x + 5 = 12?", &["5", "7", "12", "17"], 1, "Subtracting 5 from both sides leaves 7.")?,
                q(2, "Which of these is an expression?", &["3x + 2", "x = 4", "2 = 2"], 0, "3x + 2 has no equals sign, so it is an expression.")?,
                q(3, "What is 2x when x = 6?", &["8", "12", "26", "3"], 1, "Multiplying 2 by 6 gives 12.")?,
            ],
            1,
        )?,
        topic(
            "linear-equations",
            "Linear Equations",
            "Mathematics",
            "Solving and graphing equations of the form y = mx + b.",
            Difficulty::Intermediate,
            75,
            30,
            "A linear equation graphs as a straight line. In y = mx + b, m is the slope and b is the y-intercept. \
             The slope measures how much y changes when x increases by one. \
             Two points are enough to determine a line.",
            vec![
                q(1, "In y = 3x + 4, what is the slope?", &["4", "3", "7", "x"], 1, "The coefficient of x, 3, is the slope.")?,
                q(2, "Where does y = 2x - 6 cross the y-axis?", &["-6", "2", "6", "3"], 0, "At x = 0 the line is at its intercept, -6.")?,
                q(3, "Solve 4x - 8 = 0.", &["-2", "8", "2", "4"], 2, "Add 8 and divide by 4 to get 2.")?,
            ],
            2,
        )?,
        topic(
            "photosynthesis",
            "Photosynthesis",
            "Science",
            "How plants turn light, water and carbon dioxide into food.",
            Difficulty::Beginner,
            50,
            20,
            "Plants capture sunlight using a green pigment in their leaves. They combine carbon dioxide and water to build glucose. \
             Oxygen is released as a by-product. \
             This process happens inside chloroplasts.",
            vec![
                q(1, "Which pigment captures light?", &["Hemoglobin", "Chlorophyll", "Melanin", "Keratin"], 1, "Chlorophyll absorbs red and blue light in the chloroplasts.")?,
                q(2, "Which gas do plants release?", &["Oxygen", "Nitrogen", "Helium"], 0, "Oxygen is the by-product of splitting water.")?,
                q(3, "Where does photosynthesis happen?", &["Mitochondria", "Nucleus", "Chloroplasts"], 2, "Chloroplasts hold the light-capturing machinery.")?,
            ],
            3,
        )?,
        topic(
            "newtons-laws",
            "Newton's Laws of Motion",
            "Science",
            "Inertia, force and acceleration, action and reaction.",
            Difficulty::Intermediate,
            75,
            35,
            "An object keeps its state of motion unless a force acts on it. The acceleration of an object equals the net force divided by its mass. \
             Every action has an equal and opposite reaction. \
             Together these laws describe everyday motion.",
            vec![
                q(1, "What is the formula for the second law?", &["F = ma", "E = mc^2", "V = IR"], 0, "F = ma relates force, mass and acceleration.")?,
                q(2, "A 2 kg ball is pushed with 10 N. What is its acceleration?", &["20 m/s^2", "5 m/s^2", "12 m/s^2", "0.2 m/s^2"], 1, "Dividing 10 N by 2 kg gives 5 m/s^2.")?,
                q(3, "The tendency to resist changes in motion is called?", &["Momentum", "Friction", "Inertia", "Gravity"], 2, "Inertia is described by the first law.")?,
            ],
            4,
        )?,
        topic(
            "intro-to-python",
            "Introduction to Python",
            "Programming",
            "Variables, printing and simple arithmetic in Python.",
            Difficulty::Beginner,
            50,
            25,
            "Python runs your code line by line. The print function writes values to the screen. \
             Variables are created the first time you assign to them. \
             Indentation marks which lines belong to a block.",
            vec![
                q(1, "Which function writes output?", &["echo", "print", "write", "say"], 1, "The built-in print function writes to standard output.")?,
                q(2, "What does 7 // 2 evaluate to?", &["3.5", "3", "4"], 1, "Floor division drops the fractional part, leaving 3.")?,
                q(3, "How does Python mark a block?", &["Braces", "Indentation", "Semicolons"], 1, "Indentation is significant in Python.")?,
            ],
            5,
        )?,
        topic(
            "recursion",
            "Recursion",
            "Programming",
            "Functions that call themselves, base cases and the call stack.",
            Difficulty::Advanced,
            100,
            40,
            "A recursive function solves a problem by calling itself on a smaller input. Every recursion needs a base case that stops it. \
             Each call gets its own frame on the call stack. \
             Missing base cases lead to stack overflows.",
            vec![
                q(1, "What stops a recursion?", &["A loop", "A base case", "A return type"], 1, "The base case returns without recursing.")?,
                q(2, "What is factorial(4)?", &["10", "16", "24", "12"], 2, "4 * 3 * 2 * 1 is 24.")?,
                q(3, "Unbounded recursion eventually causes?", &["A stack overflow", "A syntax error", "Faster code"], 0, "Each call consumes stack until it runs out.")?,
            ],
            6,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_valid_and_ordered() {
        let topics = catalog().unwrap();
        assert_eq!(topics.len(), 6);
        for (i, t) in topics.iter().enumerate() {
            assert_eq!(t.order as usize, i + 1);
            assert_eq!(t.quiz.len(), 3);
            assert!(t.quiz.iter().all(|q| q.answer < q.options.len()));
        }
    }

    #[test]
    fn demo_data_wires_class_assignment_and_progress() {
        let repos = Repositories::new();
        seed_topics(&repos).unwrap();
        let now = Utc::now();
        let demo = seed_demo_data(&repos, &PasswordHasher::new(), now).unwrap();

        assert_eq!(repos.users.len(), 3);
        let class = repos.classrooms.get(&demo.class_id).unwrap();
        assert_eq!(class.join_code, DEMO_JOIN_CODE);
        assert_eq!(class.teacher_id, demo.teacher_id);
        assert!(class.is_student(demo.student_id));
        assert!(!class.is_student(demo.second_student_id));

        let assignment = repos.assignments.get(&demo.assignment_id).unwrap();
        assert_eq!(assignment.title, "Algebra Basics");
        assert_eq!(assignment.due_at, Some(now + Duration::days(7)));

        let progress = repos.progress.get(&demo.student_id).unwrap();
        assert_eq!(progress.xp, 50);
        assert_eq!(progress.completed[0].best_score, 80);
    }

    #[test]
    fn demo_users_are_not_seeded_twice() {
        let repos = Repositories::new();
        seed_topics(&repos).unwrap();
        seed_demo_data(&repos, &PasswordHasher::new(), Utc::now()).unwrap();
        assert!(seed_demo_data(&repos, &PasswordHasher::new(), Utc::now()).is_err());
    }
}
