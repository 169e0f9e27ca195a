//! Model-backed scoring: TF-IDF narrowing followed by an external model decision.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K_CODES, MAX_MODEL_POLICY_CHARS, TFIDF_MAX_FEATURES,
};
use crate::data::ReferenceCatalog;
use crate::evidence::{Evidence, MethodIdentity, MethodKind};

use super::client::{ModelCandidate, ModelClient, ModelRequest};
use super::error::MethodError;
use super::text::truncate_chars;
use super::tfidf::TfidfIndex;
use super::ScoringMethod;

pub const MODEL_METHOD_NAME: &str = "direct_match_llm";
pub const MODEL_METHOD_VERSION: &str = "1.0";

const TRUNCATION_MARKER: &str = "\n...[truncated]";

#[derive(Debug, Clone)]
pub struct ModelMethodConfig {
    /// Candidates offered to the model.
    pub top_k_codes: usize,

    /// Candidates below this cosine similarity are never offered.
    pub similarity_threshold: f64,

    pub max_features: usize,

    /// Policy text longer than this (in characters) is truncated before the call.
    pub max_policy_chars: usize,
}

impl Default for ModelMethodConfig {
    fn default() -> Self {
        Self {
            top_k_codes: DEFAULT_TOP_K_CODES,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            max_features: TFIDF_MAX_FEATURES,
            max_policy_chars: MAX_MODEL_POLICY_CHARS,
        }
    }
}

/// [`ScoringMethod`] that asks an external model to pick codes from a narrowed candidate set.
///
/// The TF-IDF index is built once at construction. Each call ranks the catalog against the
/// policy, offers the top-K candidates to the [`ModelClient`], and turns the model's
/// selections into evidence. Selections outside the candidate set are dropped; a selection
/// whose confidence is not a finite value in `[0.0, 1.0]` fails the call.
pub struct ModelBackedMethod {
    identity: MethodIdentity,
    config: ModelMethodConfig,
    index: TfidfIndex,
    client: Arc<dyn ModelClient>,
}

impl std::fmt::Debug for ModelBackedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBackedMethod")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .field("indexed_codes", &self.index.len())
            .finish()
    }
}

impl ModelBackedMethod {
    pub fn new(
        catalog: &ReferenceCatalog,
        client: Arc<dyn ModelClient>,
        config: ModelMethodConfig,
    ) -> Self {
        let index = TfidfIndex::build(catalog, config.max_features);
        Self {
            identity: MethodIdentity::new(
                MODEL_METHOD_NAME,
                MODEL_METHOD_VERSION,
                MethodKind::Model,
            ),
            config,
            index,
            client,
        }
    }

    pub fn config(&self) -> &ModelMethodConfig {
        &self.config
    }

    fn candidates(&self, policy_text: &str, catalog: &ReferenceCatalog) -> Vec<ModelCandidate> {
        self.index
            .top_k(
                policy_text,
                self.config.top_k_codes,
                self.config.similarity_threshold,
            )
            .into_iter()
            .filter(|c| catalog.contains(&c.code))
            .map(|c| ModelCandidate {
                code: c.code,
                description: c.description,
                similarity: c.similarity,
            })
            .collect()
    }

    fn prepare_text(&self, policy_text: &str) -> String {
        let truncated = truncate_chars(policy_text, self.config.max_policy_chars);
        if truncated.len() < policy_text.len() {
            format!("{}{}", truncated, TRUNCATION_MARKER)
        } else {
            policy_text.to_string()
        }
    }
}

#[async_trait]
impl ScoringMethod for ModelBackedMethod {
    fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    async fn infer(
        &self,
        policy_text: &str,
        catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        let candidates = self.candidates(policy_text, catalog);
        if candidates.is_empty() {
            debug!(
                threshold = self.config.similarity_threshold,
                "No catalog candidates above similarity threshold"
            );
            return Ok(Vec::new());
        }

        debug!(candidates = candidates.len(), "Requesting model selection");

        let request = ModelRequest {
            policy_text: self.prepare_text(policy_text),
            candidates,
        };

        let response = self
            .client
            .select_codes(&request)
            .await
            .map_err(|source| MethodError::Model {
                method: self.identity.name.clone(),
                source,
            })?;

        let similarity: HashMap<&str, f64> = request
            .candidates
            .iter()
            .map(|c| (c.code.as_str(), c.similarity))
            .collect();
        let num_candidates = request.candidates.len();

        let mut evidence = Vec::with_capacity(response.selections.len());
        for selection in response.selections {
            let Some(&candidate_similarity) = similarity.get(selection.code.as_str()) else {
                warn!(
                    code = %selection.code,
                    "Model selected a code outside the candidate set, skipping"
                );
                continue;
            };

            let confidence = selection.confidence;
            if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
                return Err(MethodError::InvalidConfidence {
                    method: self.identity.name.clone(),
                    code: selection.code,
                    value: confidence,
                });
            }

            let trace = vec![
                format!(
                    "Narrowed catalog to {} candidates by TF-IDF description similarity",
                    num_candidates
                ),
                format!(
                    "Candidate {} description similarity: {:.3}",
                    selection.code, candidate_similarity
                ),
                format!("Model reasoning: {}", selection.reasoning),
            ];

            evidence.push(
                Evidence::new(
                    selection.code,
                    self.identity.clone(),
                    confidence,
                    confidence,
                    selection.reasoning,
                )
                .with_decision_trace(trace)
                .with_model(response.model.clone())
                .with_metadata("matching_method", "tfidf_description_similarity")
                .with_metadata("description_similarity_score", candidate_similarity)
                .with_metadata("num_candidate_codes", num_candidates),
            );
        }

        debug!(evidence = evidence.len(), "Model selection mapped to evidence");
        Ok(evidence)
    }
}
