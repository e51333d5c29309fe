use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Output of a tutor job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiResult {
    /// Primary score for the result (job-specific meaning).
    pub score: f64,

    /// Confidence in \[0, 1\].
    pub confidence: f64,

    /// Human-readable text shown to the learner.
    pub explanation: Option<String>,

    /// Structured payload; always carries `source` and `kind`.
    pub metadata: JsonValue,
}

impl AiResult {
    /// A result produced by the built-in mock tutor.
    pub fn mock(kind: &'static str, score: f64, confidence: f64) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), JsonValue::from("mock"));
        metadata.insert("kind".to_string(), JsonValue::from(kind));
        Self {
            score,
            confidence,
            explanation: None,
            metadata: JsonValue::Object(metadata),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Add one metadata field (replaces an existing key).
    pub fn with_field(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        if let JsonValue::Object(map) = &mut self.metadata {
            map.insert(key.to_string(), value.into());
        }
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_results_are_tagged() {
        let r = AiResult::mock("tutor.explain", 1.0, 0.9)
            .with_explanation("hello")
            .with_field("topic_id", "cells");
        assert_eq!(r.metadata["source"], "mock");
        assert_eq!(r.metadata["kind"], "tutor.explain");
        assert_eq!(r.metadata["topic_id"], "cells");
        assert_eq!(r.explanation.as_deref(), Some("hello"));
    }
}
