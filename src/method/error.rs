use std::time::Duration;

use thiserror::Error;

use super::client::ModelClientError;

/// Failure of one scoring method on one policy text.
///
/// Recovered by the engine: recorded, logged, and excluded from the evidence pool.
#[derive(Debug, Error)]
pub enum MethodError {
    #[error("method '{method}' timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("method '{method}' model call failed: {source}")]
    Model {
        method: String,
        #[source]
        source: ModelClientError,
    },

    #[error("method '{method}' cannot normalize confidence {value} for code {code}")]
    InvalidConfidence {
        method: String,
        code: String,
        value: f64,
    },

    #[error("method '{method}' failed: {reason}")]
    Failed { method: String, reason: String },
}

impl MethodError {
    /// Name of the method that failed.
    pub fn method(&self) -> &str {
        match self {
            MethodError::Timeout { method, .. }
            | MethodError::Model { method, .. }
            | MethodError::InvalidConfidence { method, .. }
            | MethodError::Failed { method, .. } => method,
        }
    }

    pub fn failed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        MethodError::Failed {
            method: method.into(),
            reason: reason.into(),
        }
    }
}
