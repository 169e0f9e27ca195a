use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{FinalCode, Summary};
use crate::engine::MethodFailure;
use crate::evidence::Evidence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Run-level record of how a row's result was produced.
pub struct Audit {
    pub pipeline_version: String,
    pub aggregation_version: String,
    pub run_id: Uuid,
    pub input_hash: String,
    pub reference_version: String,
    /// BLAKE3 digest over the loaded catalog contents.
    pub reference_fingerprint: String,
    pub timestamp: DateTime<Utc>,
    pub methods_configured: Vec<String>,
    pub num_evidence_collected: usize,
    pub method_failures: Vec<MethodFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Externally visible result for one input row.
pub struct PolicyInferenceResult {
    pub row_index: usize,
    pub codes: Vec<FinalCode>,
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<Evidence>>,
    pub audit: Audit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub policies_processed: usize,
    pub policies_with_codes: usize,
    pub codes_inferred: usize,
    pub evidence_collected: usize,
    pub method_failures: usize,
}

impl RunStats {
    pub fn from_results(results: &[PolicyInferenceResult]) -> Self {
        results.iter().fold(Self::default(), |mut stats, result| {
            stats.policies_processed += 1;
            if !result.codes.is_empty() {
                stats.policies_with_codes += 1;
            }
            stats.codes_inferred += result.codes.len();
            stats.evidence_collected += result.audit.num_evidence_collected;
            stats.method_failures += result.audit.method_failures.len();
            stats
        })
    }
}
