//! Learning domain: topic catalog, quiz grading and learner progress.
//!
//! Pure, deterministic logic (no IO, no HTTP, no storage).

pub mod progress;
pub mod quiz;
pub mod topic;

pub use progress::{
    CompletedTopic, Completion, LeaderboardEntry, LevelInfo, Progress, XP_PER_LEVEL, leaderboard, level_for_xp,
};
pub use quiz::{PASSING_SCORE, QuestionResult, QuizGrade, grade_quiz};
pub use topic::{Difficulty, PublicQuestion, QuizQuestion, Topic, TopicDetail, TopicFilter, TopicSummary};
