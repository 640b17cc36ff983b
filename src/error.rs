//! Error taxonomy for the scoring core

use thiserror::Error;

pub type ScoringResult<T> = Result<T, ScoringError>;

/// Errors surfaced by the scoring core.
///
/// `Unavailable` is the "model not loaded" condition: transports map it to a
/// service-unavailable response rather than a per-request failure. All other
/// variants are synchronous, per-call errors; nothing is retried.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Serving artifacts (model, scaler, feature names) are absent or unreadable.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// Artifacts are present but mutually inconsistent or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Batch input of the wrong overall shape, rejected before inference.
    #[error("invalid input shape: {0}")]
    InputShape(String),

    /// ONNX Runtime failure during session execution.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl<R> From<ort::Error<R>> for ScoringError {
    fn from(err: ort::Error<R>) -> Self {
        ScoringError::Inference(err.to_string())
    }
}
