use std::collections::HashSet;

use serde_json::json;

use learnhub_learning::{Progress, Topic};

use crate::job::AiJob;
use crate::result::{AiError, AiResult};

pub const DEFAULT_RECOMMENDATIONS: usize = 3;
pub const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct RecommendInput {
    pub topics: Vec<Topic>,
    pub progress: Progress,
}

/// Suggest what to study next.
///
/// Ranking: uncompleted topics only; subjects the learner has already worked
/// in come first, then easier topics, then catalog order.
#[derive(Debug, Clone)]
pub struct RecommendTopicsJob {
    input: RecommendInput,
    limit: usize,
}

impl RecommendTopicsJob {
    pub fn new(topics: Vec<Topic>, progress: Progress, limit: Option<usize>) -> Self {
        Self {
            input: RecommendInput { topics, progress },
            limit: limit
                .unwrap_or(DEFAULT_RECOMMENDATIONS)
                .clamp(1, MAX_RECOMMENDATIONS),
        }
    }
}

impl AiJob for RecommendTopicsJob {
    fn kind(&self) -> &'static str {
        "tutor.recommendations"
    }

    fn run(&self) -> Result<AiResult, AiError> {
        let RecommendInput { topics, progress } = &self.input;

        let studied: HashSet<&str> = topics
            .iter()
            .filter(|t| progress.has_completed(&t.id))
            .map(|t| t.subject.as_str())
            .collect();

        let mut candidates: Vec<&Topic> = topics
            .iter()
            .filter(|t| !progress.has_completed(&t.id))
            .collect();
        candidates.sort_by_key(|t| (!studied.contains(t.subject.as_str()), t.difficulty, t.order));
        candidates.truncate(self.limit);

        let picks: Vec<serde_json::Value> = candidates
            .iter()
            .map(|t| {
                let reason = if studied.contains(t.subject.as_str()) {
                    "continue_subject"
                } else {
                    "explore"
                };
                json!({ "topic": t.summary(), "reason": reason })
            })
            .collect();

        let explanation = if picks.is_empty() {
            "You have completed every topic in the catalog.".to_string()
        } else {
            format!(
                "Recommended {} topic(s) based on {} completed topic(s).",
                picks.len(),
                progress.completed.len()
            )
        };
        let confidence = if progress.completed.is_empty() { 0.6 } else { 0.85 };

        Ok(AiResult::mock(self.kind(), picks.len() as f64, confidence)
            .with_explanation(explanation)
            .with_field("topics", picks))
    }
}
