use thiserror::Error;

/// Why a calculation was not dispatched.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("script runtime is not ready")]
    NotReady,

    #[error("a calculation is already outstanding")]
    Busy,

    #[error("failed to encode calculation request: {0}")]
    Encode(#[from] serde_json::Error),
}
