//! External model client boundary.
//!
//! The model-backed method hands a policy text and a bounded candidate list to a
//! [`ModelClient`] and receives structured `(code, confidence, reasoning)` selections back.
//! Prompting and response parsing are the client's business; the method only narrows
//! candidates and maps selections into [`Evidence`](crate::evidence::Evidence).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evidence::ModelIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub code: String,
    pub description: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub policy_text: String,
    pub candidates: Vec<ModelCandidate>,
}

#[derive(Debug, Clone, PartialEq)]
/// One code the model judged relevant, on the model's own confidence scale.
pub struct ModelSelection {
    pub code: String,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub selections: Vec<ModelSelection>,
    /// Model that answered, with token usage when reported.
    pub model: ModelIdentity,
}

#[derive(Debug, Error)]
pub enum ModelClientError {
    #[error("transport error after {attempts} attempt(s): {reason}")]
    Transport { attempts: usize, reason: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },
}

#[async_trait]
/// Request/response access to an external model.
pub trait ModelClient: Send + Sync {
    async fn select_codes(&self, request: &ModelRequest) -> Result<ModelResponse, ModelClientError>;
}
