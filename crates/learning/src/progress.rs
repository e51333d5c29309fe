//! Learner progress: XP, levels and completed topics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use learnhub_core::{DomainError, DomainResult, Entity, TopicId, UserId};

use crate::Topic;

/// XP needed per level; the level is derived as `xp / XP_PER_LEVEL + 1`.
pub const XP_PER_LEVEL: u32 = 100;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const MAX_LEADERBOARD_LIMIT: usize = 50;

pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct LevelInfo {
    pub xp: u32,
    pub level: u32,
    pub xp_into_level: u32,
    pub xp_to_next_level: u32,
}

impl LevelInfo {
    pub fn from_xp(xp: u32) -> Self {
        let into = xp % XP_PER_LEVEL;
        Self {
            xp,
            level: level_for_xp(xp),
            xp_into_level: into,
            xp_to_next_level: XP_PER_LEVEL - into,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTopic {
    pub topic_id: TopicId,
    pub best_score: u32,
    pub xp_earned: u32,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub topic_id: TopicId,
    pub xp_earned: u32,
    pub first_completion: bool,
    pub leveled_up: bool,
    pub best_score: u32,
    pub level: LevelInfo,
}

/// Per-user progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub user_id: UserId,
    pub xp: u32,
    pub completed: Vec<CompletedTopic>,
    pub quiz_attempts: u32,
}

impl Entity for Progress {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.user_id
    }
}

impl Progress {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            xp: 0,
            completed: Vec::new(),
            quiz_attempts: 0,
        }
    }

    pub fn level(&self) -> LevelInfo {
        LevelInfo::from_xp(self.xp)
    }

    pub fn has_completed(&self, topic_id: &TopicId) -> bool {
        self.completed.iter().any(|c| &c.topic_id == topic_id)
    }

    pub fn record_attempt(&mut self) {
        self.quiz_attempts = self.quiz_attempts.saturating_add(1);
    }

    /// Mark a topic complete with `score` (0..=100).
    ///
    /// XP is awarded once per topic; later completions only raise the best score.
    pub fn complete_topic(&mut self, topic: &Topic, score: u32, now: DateTime<Utc>) -> DomainResult<Completion> {
        if score > 100 {
            return Err(DomainError::validation("score must be between 0 and 100"));
        }

        let level_before = level_for_xp(self.xp);

        if let Some(existing) = self.completed.iter_mut().find(|c| c.topic_id == topic.id) {
            existing.best_score = existing.best_score.max(score);
            return Ok(Completion {
                topic_id: topic.id.clone(),
                xp_earned: 0,
                first_completion: false,
                leveled_up: false,
                best_score: existing.best_score,
                level: LevelInfo::from_xp(self.xp),
            });
        }

        self.xp = self.xp.saturating_add(topic.xp_reward);
        self.completed.push(CompletedTopic {
            topic_id: topic.id.clone(),
            best_score: score,
            xp_earned: topic.xp_reward,
            completed_at: now,
        });

        let level = self.level();
        Ok(Completion {
            topic_id: topic.id.clone(),
            xp_earned: topic.xp_reward,
            first_completion: true,
            leveled_up: level.level > level_before,
            best_score: score,
            level,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub xp: u32,
    pub level: u32,
}

/// Rank learners by XP (descending), ties broken by name.
///
/// `entries` pairs each learner's display name with their progress. `limit`
/// defaults to 10 and is clamped to `1..=50`.
pub fn leaderboard<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a Progress)>,
    limit: Option<usize>,
) -> Vec<LeaderboardEntry> {
    let limit = limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    let mut rows: Vec<(&str, &Progress)> = entries.into_iter().collect();
    rows.sort_by(|(an, ap), (bn, bp)| bp.xp.cmp(&ap.xp).then_with(|| an.cmp(bn)));

    rows.into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (name, p))| LeaderboardEntry {
            rank: i + 1,
            user_id: p.user_id,
            name: name.to_string(),
            xp: p.xp,
            level: level_for_xp(p.xp),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;
    use crate::topic::fixtures::topic;
    use proptest::prelude::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);

        let info = LevelInfo::from_xp(250);
        assert_eq!(info.xp_into_level, 50);
        assert_eq!(info.xp_to_next_level, 50);
    }

    #[test]
    fn first_completion_awards_xp_once() {
        let mut p = Progress::new(UserId::new());
        let t = topic("algebra", "Mathematics", Difficulty::Beginner, 1);

        let first = p.complete_topic(&t, 60, Utc::now()).unwrap();
        assert!(first.first_completion);
        assert_eq!(first.xp_earned, 50);
        assert_eq!(p.xp, 50);

        let again = p.complete_topic(&t, 90, Utc::now()).unwrap();
        assert!(!again.first_completion);
        assert_eq!(again.xp_earned, 0);
        assert_eq!(again.best_score, 90);
        assert_eq!(p.xp, 50);
        assert_eq!(p.completed.len(), 1);

        // A worse retry does not lower the best score.
        let worse = p.complete_topic(&t, 10, Utc::now()).unwrap();
        assert_eq!(worse.best_score, 90);
    }

    #[test]
    fn crossing_a_level_boundary_reports_level_up() {
        let mut p = Progress::new(UserId::new());
        p.xp = 80;
        let t = topic("algebra", "Mathematics", Difficulty::Beginner, 1);

        let c = p.complete_topic(&t, 100, Utc::now()).unwrap();
        assert!(c.leveled_up);
        assert_eq!(c.level.level, 2);
        assert_eq!(c.level.xp, 130);
    }

    #[test]
    fn completion_serializes_level_as_nested_object() {
        let topic = topic("algebra", "Mathematics", Difficulty::Beginner, 1);
        let mut p = Progress::new(UserId::new());
        let c = p.complete_topic(&topic, 80, Utc::now()).unwrap();

        let v = serde_json::to_value(&c).unwrap();
        assert!(v["level"].is_object());
        assert_eq!(v["level"]["level"], 1);
        assert_eq!(v["level"]["xp"], topic.xp_reward);
        assert!(v.get("xp").is_none());
    }

    #[test]
    fn score_above_100_is_rejected() {
        let mut p = Progress::new(UserId::new());
        let t = topic("algebra", "Mathematics", Difficulty::Beginner, 1);
        assert!(p.complete_topic(&t, 101, Utc::now()).is_err());
        assert!(p.completed.is_empty());
    }

    #[test]
    fn leaderboard_orders_by_xp_then_name_and_clamps() {
        let mut a = Progress::new(UserId::new());
        a.xp = 120;
        let mut b = Progress::new(UserId::new());
        b.xp = 300;
        let mut c = Progress::new(UserId::new());
        c.xp = 120;

        let board = leaderboard(vec![("Zoe", &a), ("Bea", &b), ("Amy", &c)], None);
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bea", "Amy", "Zoe"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].level, 4);

        let top = leaderboard(vec![("Zoe", &a), ("Bea", &b)], Some(0));
        assert_eq!(top.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn level_info_is_consistent(xp in 0u32..1_000_000) {
            let info = LevelInfo::from_xp(xp);
            prop_assert_eq!((info.level - 1) * XP_PER_LEVEL + info.xp_into_level, xp);
            prop_assert_eq!(info.xp_into_level + info.xp_to_next_level, XP_PER_LEVEL);
            prop_assert!(info.xp_to_next_level >= 1);
        }

        #[test]
        fn level_is_monotonic(a in 0u32..100_000, b in 0u32..100_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_xp(lo) <= level_for_xp(hi));
        }
    }
}
