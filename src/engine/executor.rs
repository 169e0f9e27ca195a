use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::data::ReferenceCatalog;
use crate::evidence::MethodIdentity;
use crate::method::{MethodError, ScoringMethod};

use super::error::EngineError;
use super::types::{EngineOutput, MethodFailure};

/// Runs every configured [`ScoringMethod`] against one policy text.
pub struct InferenceEngine {
    methods: Vec<Arc<dyn ScoringMethod>>,
    catalog: Arc<ReferenceCatalog>,
    method_timeout: Duration,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("methods", &self.method_names())
            .field("catalog_codes", &self.catalog.len())
            .field("method_timeout", &self.method_timeout)
            .finish()
    }
}

impl InferenceEngine {
    /// Fails fast on an empty method list, duplicate method names, or a zero timeout.
    pub fn new(
        methods: Vec<Arc<dyn ScoringMethod>>,
        catalog: Arc<ReferenceCatalog>,
        method_timeout: Duration,
    ) -> Result<Self, EngineError> {
        if methods.is_empty() {
            return Err(EngineError::NoMethods);
        }
        if method_timeout.is_zero() {
            return Err(EngineError::ZeroTimeout);
        }

        let mut names = HashSet::new();
        for method in &methods {
            if !names.insert(method.name().to_string()) {
                return Err(EngineError::DuplicateMethod {
                    name: method.name().to_string(),
                });
            }
        }

        Ok(Self {
            methods,
            catalog,
            method_timeout,
        })
    }

    pub fn catalog(&self) -> &Arc<ReferenceCatalog> {
        &self.catalog
    }

    pub fn method_timeout(&self) -> Duration {
        self.method_timeout
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name()).collect()
    }

    pub fn method_identities(&self) -> Vec<MethodIdentity> {
        self.methods.iter().map(|m| m.identity().clone()).collect()
    }

    /// Runs all methods concurrently and collects their evidence.
    ///
    /// Never fails: method errors and timeouts land in [`EngineOutput::failures`].
    pub async fn run(&self, policy_text: &str) -> EngineOutput {
        let catalog = self.catalog.as_ref();
        let timeout = self.method_timeout;

        let calls = self.methods.iter().map(|method| async move {
            match tokio::time::timeout(timeout, method.infer(policy_text, catalog)).await {
                Ok(result) => result,
                Err(_) => Err(MethodError::Timeout {
                    method: method.name().to_string(),
                    timeout,
                }),
            }
        });

        let results = join_all(calls).await;

        let mut output = EngineOutput::default();
        for (method, result) in self.methods.iter().zip(results) {
            match result {
                Ok(evidence) => {
                    debug!(
                        method = method.name(),
                        evidence = evidence.len(),
                        "Method completed"
                    );
                    output.evidence.extend(evidence);
                }
                Err(err) => {
                    warn!(
                        method = method.name(),
                        error = %err,
                        "Method failed, continuing without it"
                    );
                    output
                        .failures
                        .push(MethodFailure::new(method.name(), err.to_string()));
                }
            }
        }

        output
    }
}
