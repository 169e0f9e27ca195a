//! Deterministic lexical scoring.
//!
//! Matches the policy's content terms against each catalog description. A code qualifies with
//! at least two shared terms, one of which must be a recognized clinical domain term.
//! Confidence grows with the number of shared terms and their specificity (how few catalog
//! descriptions contain them), saturating at `1.0`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::constants::{DEFAULT_KEYWORD_MAX_TERMS, DEFAULT_KEYWORD_MIN_MATCHES, DOMAIN_TERMS};
use crate::data::ReferenceCatalog;
use crate::evidence::{Evidence, MethodIdentity, MethodKind};

use super::error::MethodError;
use super::text::{tokenize, unique_terms};
use super::ScoringMethod;

pub const KEYWORD_METHOD_NAME: &str = "keyword_match";
pub const KEYWORD_METHOD_VERSION: &str = "2.0";

const BASE_CONFIDENCE: f64 = 0.4;
const PER_MATCH_CONFIDENCE: f64 = 0.1;
const SPECIFICITY_WEIGHT: f64 = 0.2;
const JUSTIFICATION_TERMS: usize = 5;

#[derive(Debug, Clone)]
pub struct KeywordConfig {
    /// Upper bound on distinct policy terms considered.
    pub max_terms: usize,

    /// Shared terms required per code. Never below 2.
    pub min_matches: usize,

    /// Domain terms recognized in addition to the built-in vocabulary.
    pub extra_domain_terms: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            max_terms: DEFAULT_KEYWORD_MAX_TERMS,
            min_matches: DEFAULT_KEYWORD_MIN_MATCHES,
            extra_domain_terms: Vec::new(),
        }
    }
}

impl KeywordConfig {
    pub fn with_min_matches(mut self, min_matches: usize) -> Self {
        self.min_matches = min_matches.max(DEFAULT_KEYWORD_MIN_MATCHES);
        self
    }

    pub fn with_domain_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_domain_terms
            .extend(terms.into_iter().map(|t| t.into().to_lowercase()));
        self
    }
}

/// Keyword-matching [`ScoringMethod`].
///
/// Description term sets and per-term document frequencies are computed once from the catalog
/// given to [`KeywordMethod::new`]; `infer` only reads them.
#[derive(Debug)]
pub struct KeywordMethod {
    identity: MethodIdentity,
    config: KeywordConfig,
    domain_terms: HashSet<String>,
    description_terms: HashMap<String, HashSet<String>>,
    document_frequency: HashMap<String, usize>,
    catalog_size: usize,
}

impl KeywordMethod {
    pub fn new(catalog: &ReferenceCatalog, config: KeywordConfig) -> Self {
        let mut domain_terms: HashSet<String> =
            DOMAIN_TERMS.iter().map(|t| t.to_string()).collect();
        domain_terms.extend(config.extra_domain_terms.iter().cloned());

        let mut description_terms = HashMap::with_capacity(catalog.len());
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for entry in catalog {
            let terms: HashSet<String> = tokenize(&entry.description).into_iter().collect();
            for term in &terms {
                *document_frequency.entry(term.clone()).or_default() += 1;
            }
            description_terms.insert(entry.code.clone(), terms);
        }

        debug!(
            codes = catalog.len(),
            vocabulary = document_frequency.len(),
            "Keyword index built"
        );

        Self {
            identity: MethodIdentity::new(
                KEYWORD_METHOD_NAME,
                KEYWORD_METHOD_VERSION,
                MethodKind::Deterministic,
            ),
            config: KeywordConfig {
                min_matches: config.min_matches.max(DEFAULT_KEYWORD_MIN_MATCHES),
                ..config
            },
            domain_terms,
            description_terms,
            document_frequency,
            catalog_size: catalog.len(),
        }
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    pub fn is_domain_term(&self, term: &str) -> bool {
        self.domain_terms.contains(term)
    }

    /// `1.0` for a term unique to one description, `0.0` for a term in every description.
    pub fn specificity(&self, term: &str) -> f64 {
        if self.catalog_size <= 1 {
            return 1.0;
        }
        let df = self
            .document_frequency
            .get(term)
            .copied()
            .unwrap_or(1)
            .clamp(1, self.catalog_size);
        1.0 - (df - 1) as f64 / (self.catalog_size - 1) as f64
    }

    fn score(
        &self,
        policy_terms: &HashSet<&str>,
        code: &str,
        description: &str,
    ) -> Option<Evidence> {
        let owned;
        let desc_terms = match self.description_terms.get(code) {
            Some(terms) => terms,
            None => {
                owned = tokenize(description).into_iter().collect::<HashSet<_>>();
                &owned
            }
        };

        let mut matched: Vec<&str> = desc_terms
            .iter()
            .map(String::as_str)
            .filter(|t| policy_terms.contains(t))
            .collect();

        if matched.len() < self.config.min_matches {
            return None;
        }

        matched.sort_unstable();

        let domain_matches: Vec<&str> = matched
            .iter()
            .copied()
            .filter(|t| self.is_domain_term(t))
            .collect();
        if domain_matches.is_empty() {
            return None;
        }

        let num_matches = matched.len();
        let specificity_sum: f64 = matched.iter().map(|t| self.specificity(t)).sum();
        let mean_specificity = specificity_sum / num_matches as f64;

        let normalized = (BASE_CONFIDENCE
            + PER_MATCH_CONFIDENCE * num_matches as f64
            + SPECIFICITY_WEIGHT * mean_specificity)
            .min(1.0);
        let raw = num_matches as f64 + specificity_sum;

        let shown = matched
            .iter()
            .take(JUSTIFICATION_TERMS)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let justification = format!(
            "Found {} matching terms ({}) between policy text and HCPCS {}: '{}'",
            num_matches, shown, code, description
        );

        Some(
            Evidence::new(code, self.identity.clone(), normalized, raw, justification)
                .with_metadata("matching_terms", json!(matched))
                .with_metadata("domain_terms", json!(domain_matches))
                .with_metadata("num_matches", num_matches)
                .with_metadata("mean_specificity", mean_specificity),
        )
    }
}

#[async_trait]
impl ScoringMethod for KeywordMethod {
    fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    async fn infer(
        &self,
        policy_text: &str,
        catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        let terms = unique_terms(policy_text, self.config.max_terms);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let policy_terms: HashSet<&str> = terms.iter().map(String::as_str).collect();

        let evidence: Vec<Evidence> = catalog
            .iter()
            .filter_map(|entry| self.score(&policy_terms, &entry.code, &entry.description))
            .collect();

        debug!(
            policy_terms = policy_terms.len(),
            matches = evidence.len(),
            "Keyword scoring complete"
        );

        Ok(evidence)
    }
}
