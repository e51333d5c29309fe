use crate::result::{AiError, AiResult};

/// A single tutor inference.
///
/// Inputs are snapshots handed over by the caller; this crate stays
/// storage-agnostic.
pub trait AiJob: Send + Sync {
    /// Stable identifier, recorded as `metadata.kind`.
    fn kind(&self) -> &'static str;

    /// Execute the job. Must not mutate domain state.
    fn run(&self) -> Result<AiResult, AiError>;
}
