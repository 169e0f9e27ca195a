use serde::{Deserialize, Serialize};

use crate::evidence::Evidence;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A method that produced no evidence for one policy because it failed.
pub struct MethodFailure {
    pub method: String,
    pub reason: String,
}

impl MethodFailure {
    pub fn new(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Evidence pool and failure report for one policy text.
///
/// `evidence` is in collection order (method registration order, then each method's own
/// order). Only the aggregator's final tie-break may rely on it.
pub struct EngineOutput {
    pub evidence: Vec<Evidence>,
    pub failures: Vec<MethodFailure>,
}

impl EngineOutput {
    /// `true` when every configured method failed.
    pub fn all_failed(&self, configured: usize) -> bool {
        configured > 0 && self.failures.len() == configured
    }
}
