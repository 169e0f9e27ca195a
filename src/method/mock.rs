//! Mock methods and model client for tests.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::data::ReferenceCatalog;
use crate::evidence::{Evidence, MethodIdentity, MethodKind, ModelIdentity};

use super::client::{ModelClient, ModelClientError, ModelRequest, ModelResponse, ModelSelection};
use super::error::MethodError;
use super::ScoringMethod;

/// Returns a fixed list of `(code, confidence)` findings on every call.
#[derive(Debug, Clone)]
pub struct StaticMethod {
    identity: MethodIdentity,
    findings: Vec<(String, f64)>,
}

impl StaticMethod {
    pub fn new(name: &str, kind: MethodKind) -> Self {
        Self {
            identity: MethodIdentity::new(name, "test", kind),
            findings: Vec::new(),
        }
    }

    pub fn with_finding(mut self, code: &str, confidence: f64) -> Self {
        self.findings.push((code.to_string(), confidence));
        self
    }
}

#[async_trait]
impl ScoringMethod for StaticMethod {
    fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    async fn infer(
        &self,
        _policy_text: &str,
        _catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        Ok(self
            .findings
            .iter()
            .map(|(code, confidence)| {
                Evidence::new(
                    code.clone(),
                    self.identity.clone(),
                    *confidence,
                    *confidence,
                    format!("{} matched {}", self.identity.name, code),
                )
            })
            .collect())
    }
}

/// Always fails with [`MethodError::Failed`].
#[derive(Debug, Clone)]
pub struct FailingMethod {
    identity: MethodIdentity,
    reason: String,
}

impl FailingMethod {
    pub fn new(name: &str, reason: &str) -> Self {
        Self {
            identity: MethodIdentity::new(name, "test", MethodKind::Model),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ScoringMethod for FailingMethod {
    fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    async fn infer(
        &self,
        _policy_text: &str,
        _catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        Err(MethodError::failed(&self.identity.name, &self.reason))
    }
}

/// Sleeps before delegating to an inner [`StaticMethod`].
#[derive(Debug, Clone)]
pub struct SlowMethod {
    inner: StaticMethod,
    delay: Duration,
}

impl SlowMethod {
    pub fn new(inner: StaticMethod, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ScoringMethod for SlowMethod {
    fn identity(&self) -> &MethodIdentity {
        self.inner.identity()
    }

    async fn infer(
        &self,
        policy_text: &str,
        catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        tokio::time::sleep(self.delay).await;
        self.inner.infer(policy_text, catalog).await
    }
}

enum MockReply {
    Selections(Vec<ModelSelection>),
    Empty,
    Transport(String),
}

/// Scripted [`ModelClient`] that records every request it receives.
pub struct MockModelClient {
    reply: MockReply,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockModelClient {
    pub fn with_selections(selections: Vec<(&str, f64, &str)>) -> Self {
        Self::new(MockReply::Selections(
            selections
                .into_iter()
                .map(|(code, confidence, reasoning)| ModelSelection {
                    code: code.to_string(),
                    confidence,
                    reasoning: reasoning.to_string(),
                })
                .collect(),
        ))
    }

    pub fn empty_response() -> Self {
        Self::new(MockReply::Empty)
    }

    pub fn unreachable(reason: &str) -> Self {
        Self::new(MockReply::Transport(reason.to_string()))
    }

    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn select_codes(
        &self,
        request: &ModelRequest,
    ) -> Result<ModelResponse, ModelClientError> {
        self.requests.lock().push(request.clone());

        match &self.reply {
            MockReply::Selections(selections) => Ok(ModelResponse {
                selections: selections.clone(),
                model: ModelIdentity {
                    prompt_tokens: Some(120),
                    completion_tokens: Some(40),
                    total_tokens: Some(160),
                    ..ModelIdentity::new("mock-model", "mock")
                },
            }),
            MockReply::Empty => Err(ModelClientError::EmptyResponse),
            MockReply::Transport(reason) => Err(ModelClientError::Transport {
                attempts: 1,
                reason: reason.clone(),
            }),
        }
    }
}
