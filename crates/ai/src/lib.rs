//! `learnhub-ai`
//!
//! **Responsibility:** the tutor boundary (explanations, hints,
//! recommendations, quiz drafts).
//!
//! Every job here is a deterministic mock derived from catalog content:
//! - It must not mutate learner progress or classroom state.
//! - It returns an [`AiResult`] the API layer serializes as-is.

pub mod job;
pub mod recommend;
pub mod result;
pub mod tutor;

pub use job::AiJob;
pub use recommend::{RecommendInput, RecommendTopicsJob};
pub use result::{AiError, AiResult};
pub use tutor::{ExplainTopicJob, GenerateQuizJob, HintJob};
