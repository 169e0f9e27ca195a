use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::data::ReferenceCatalog;
use crate::evidence::Evidence;

use super::error::AggregationError;
use super::types::{Aggregation, FinalCode, MethodPrecedence, Provenance, RunContext, Summary};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationConfig {
    threshold: f64,
    precedence: MethodPrecedence,
}

impl AggregationConfig {
    pub fn new(threshold: f64) -> Result<Self, AggregationError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(AggregationError::InvalidThreshold { value: threshold });
        }
        Ok(Self {
            threshold,
            precedence: MethodPrecedence::default(),
        })
    }

    pub fn with_precedence(mut self, precedence: MethodPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn precedence(&self) -> &MethodPrecedence {
        &self.precedence
    }
}

struct Group {
    winner: Evidence,
    methods: BTreeSet<String>,
}

/// Max-confidence evidence reducer.
///
/// Stateless apart from its configuration, so one instance is shared across all rows.
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Reduces one policy's evidence pool into ranked final codes and a summary.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError`] if any record names a code missing from `catalog` or
    /// carries a confidence outside `[0.0, 1.0]`. Nothing is aggregated in that case.
    pub fn aggregate(
        &self,
        pool: Vec<Evidence>,
        catalog: &ReferenceCatalog,
        run: &RunContext,
    ) -> Result<Aggregation, AggregationError> {
        for evidence in &pool {
            validate(evidence, catalog)?;
        }

        let pool_size = pool.len();
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Group> = HashMap::new();

        for evidence in pool {
            match groups.get_mut(&evidence.code) {
                Some(group) => {
                    group.methods.insert(evidence.method.name.clone());
                    if self.beats(&evidence, &group.winner) {
                        group.winner = evidence;
                    }
                }
                None => {
                    order.push(evidence.code.clone());
                    let mut methods = BTreeSet::new();
                    methods.insert(evidence.method.name.clone());
                    groups.insert(
                        evidence.code.clone(),
                        Group {
                            winner: evidence,
                            methods,
                        },
                    );
                }
            }
        }

        let distinct = order.len();
        let threshold = self.config.threshold;

        let mut codes: Vec<FinalCode> = order
            .into_iter()
            .filter_map(|code| groups.remove(&code))
            .filter(|group| group.winner.normalized_confidence >= threshold)
            .map(|group| finalize(group, run))
            .collect();

        codes.sort_by(|a, b| {
            b.aggregated_confidence
                .total_cmp(&a.aggregated_confidence)
                .then_with(|| a.code.cmp(&b.code))
        });

        let methods_used: BTreeSet<&str> = codes
            .iter()
            .flat_map(|c| c.contributing_methods.iter().map(String::as_str))
            .collect();

        let summary = Summary {
            total_codes_found: codes.len(),
            threshold,
            methods_used: methods_used.into_iter().map(str::to_string).collect(),
        };

        debug!(
            evidence = pool_size,
            distinct_codes = distinct,
            surviving = codes.len(),
            threshold,
            "Aggregated evidence pool"
        );

        Ok(Aggregation {
            below_threshold: distinct - codes.len(),
            codes,
            summary,
        })
    }

    /// Whether `challenger` replaces `incumbent` as a group's winner.
    ///
    /// The incumbent always arrived earlier, so remaining ties keep it.
    fn beats(&self, challenger: &Evidence, incumbent: &Evidence) -> bool {
        match challenger
            .normalized_confidence
            .total_cmp(&incumbent.normalized_confidence)
        {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => {
                let precedence = &self.config.precedence;
                precedence.rank(challenger.method.kind) < precedence.rank(incumbent.method.kind)
            }
        }
    }
}

fn validate(evidence: &Evidence, catalog: &ReferenceCatalog) -> Result<(), AggregationError> {
    if !catalog.contains(&evidence.code) {
        return Err(AggregationError::UnknownCode {
            code: evidence.code.clone(),
            method: evidence.method.name.clone(),
        });
    }

    if !evidence.has_valid_confidence() {
        return Err(AggregationError::ConfidenceOutOfRange {
            code: evidence.code.clone(),
            method: evidence.method.name.clone(),
            value: evidence.normalized_confidence,
        });
    }

    Ok(())
}

fn finalize(group: Group, run: &RunContext) -> FinalCode {
    let Group { winner, methods } = group;

    FinalCode {
        code: winner.code,
        aggregated_confidence: winner.normalized_confidence,
        justification: winner.justification,
        decision_trace: winner.decision_trace,
        contributing_methods: methods,
        provenance: Provenance {
            method: winner.method,
            model: winner.model,
            reference_version: run.reference_version.clone(),
            pipeline_version: run.pipeline_version.clone(),
            aggregation_version: run.aggregation_version.clone(),
            run_id: run.run_id,
            input_hash: run.input_hash.clone(),
            timestamp: run.timestamp,
        },
    }
}
