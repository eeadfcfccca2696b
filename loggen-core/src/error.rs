//! Error types for configuration and emission.

use thiserror::Error;

/// Errors raised while validating the configuration of a run.
///
/// These are detected before the pacing loop starts. A run that fails validation never emits a
/// single record.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No target rate was provided.
    #[error("target rate is not set, provide it via the `LPS` environment variable")]
    MissingRate,

    /// The target rate could not be parsed as an integer.
    #[error("target rate `{0}` is not a number")]
    InvalidRate(String),

    /// The target rate parsed, but is zero or negative.
    #[error("target rate must be a positive number, got {0}")]
    NonPositiveRate(i64),

    /// The tick interval is zero.
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,

    /// The burst cap is zero, which would never emit anything.
    #[error("burst cap must be greater than zero")]
    ZeroBurstCap,

    /// The payload template set is empty.
    #[error("at least one payload template is required")]
    NoTemplates,
}

/// Errors reported by a [`LineSink`](crate::sink::LineSink) while emitting records.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O errors from the underlying writer.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors serializing a record.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;
