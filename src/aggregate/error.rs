use thiserror::Error;

/// Contract violation by a scoring method, detected while aggregating.
///
/// These indicate a broken method implementation, not a runtime condition, and are surfaced
/// rather than silently corrected.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("method '{method}' produced evidence for unknown code '{code}'")]
    UnknownCode { code: String, method: String },

    #[error("method '{method}' produced confidence {value} for code '{code}' outside [0, 1]")]
    ConfidenceOutOfRange {
        code: String,
        method: String,
        value: f64,
    },

    #[error("invalid confidence threshold {value}: must be between 0.0 and 1.0")]
    InvalidThreshold { value: f64 },
}
