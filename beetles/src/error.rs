/// Error type returned by user-supplied capabilities (story tellers, transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can make a step dispatch fail.
///
/// Cancellation is not in here: a cancelled dispatch ends with
/// [`crate::PublishOutcome::Cancelled`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("workload generation failed for slot {slot}: {source}")]
    Workload {
        slot: usize,
        #[source]
        source: BoxError,
    },

    #[error("publishing work order {index} failed: {source}")]
    Transport {
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("failed to encode work order: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Returned by [`crate::IntervalScheduler::wait_for`] when the cancel signal fires
/// while waiting.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("wait cancelled")]
pub struct Cancelled;
