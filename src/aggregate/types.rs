use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evidence::{MethodIdentity, MethodKind, ModelIdentity};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Tie-break order between method kinds; earlier kinds win exact confidence ties.
///
/// Kinds not listed rank after every listed kind.
pub struct MethodPrecedence(Vec<MethodKind>);

impl Default for MethodPrecedence {
    fn default() -> Self {
        Self(vec![MethodKind::Model, MethodKind::Deterministic])
    }
}

impl MethodPrecedence {
    pub fn new(order: Vec<MethodKind>) -> Result<Self, String> {
        let mut seen = BTreeSet::new();
        for kind in &order {
            if !seen.insert(*kind) {
                return Err(format!("method kind '{}' listed twice", kind));
            }
        }
        Ok(Self(order))
    }

    pub fn order(&self) -> &[MethodKind] {
        &self.0
    }

    /// Position of `kind` in the order; lower ranks win.
    pub fn rank(&self, kind: MethodKind) -> usize {
        self.0
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.0.len())
    }
}

impl FromStr for MethodPrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(MethodKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if order.is_empty() {
            return Err("precedence list is empty".to_string());
        }

        Self::new(order)
    }
}

impl fmt::Display for MethodPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.iter().map(MethodKind::as_str).collect();
        f.write_str(&parts.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Per-policy run identity shared by every [`Provenance`] record for that policy.
pub struct RunContext {
    pub run_id: Uuid,
    /// BLAKE3 hex digest of the normalized policy text.
    pub input_hash: String,
    pub timestamp: DateTime<Utc>,
    pub reference_version: String,
    pub pipeline_version: String,
    pub aggregation_version: String,
}

impl RunContext {
    pub fn new(run_id: Uuid, input_hash: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            run_id,
            input_hash: input_hash.into(),
            timestamp,
            reference_version: String::new(),
            pipeline_version: String::new(),
            aggregation_version: String::new(),
        }
    }

    pub fn with_versions(
        mut self,
        reference_version: impl Into<String>,
        pipeline_version: impl Into<String>,
        aggregation_version: impl Into<String>,
    ) -> Self {
        self.reference_version = reference_version.into();
        self.pipeline_version = pipeline_version.into();
        self.aggregation_version = aggregation_version.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// How a [`FinalCode`] was derived.
pub struct Provenance {
    /// Method behind the winning evidence.
    pub method: MethodIdentity,
    pub model: Option<ModelIdentity>,
    pub reference_version: String,
    pub pipeline_version: String,
    pub aggregation_version: String,
    pub run_id: Uuid,
    pub input_hash: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One code that survived aggregation for one policy text.
pub struct FinalCode {
    pub code: String,
    /// Maximum `normalized_confidence` across the code's evidence.
    pub aggregated_confidence: f64,
    pub justification: String,
    pub decision_trace: Option<Vec<String>>,
    /// Every method that produced evidence for this code.
    pub contributing_methods: BTreeSet<String>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_codes_found: usize,
    pub threshold: f64,
    /// Sorted distinct methods behind the surviving codes.
    pub methods_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Ordered by confidence descending, then code ascending.
    pub codes: Vec<FinalCode>,
    pub summary: Summary,
    /// Distinct codes dropped by the threshold.
    pub below_threshold: usize,
}
