//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Confidence or similarity threshold outside `[0.0, 1.0]`.
    #[error("invalid {name} '{value}': must be between 0.0 and 1.0")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {var}='{value}': {source}")]
    FloatParseError {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Method precedence list is malformed.
    #[error("invalid method precedence '{value}': {reason}")]
    InvalidPrecedence { value: String, reason: String },

    /// A count or duration that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// A version tag was empty.
    #[error("{name} must not be empty")]
    EmptyVersion { name: &'static str },
}
