use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::{AggregationConfig, Aggregator, RunContext};
use crate::config::Config;
use crate::constants::PROGRESS_LOG_INTERVAL;
use crate::data::{PolicyRow, normalize_policy_text};
use crate::engine::{EngineOutput, InferenceEngine};
use crate::hashing::{catalog_fingerprint, input_hash};

use super::error::PipelineError;
use super::types::{Audit, PolicyInferenceResult};

/// End-to-end processor for one invocation.
///
/// Owns the engine and aggregator and stamps every result with the same `run_id`.
#[derive(Debug)]
pub struct Pipeline {
    engine: InferenceEngine,
    aggregator: Aggregator,
    config: Config,
    run_id: Uuid,
    reference_fingerprint: String,
}

impl Pipeline {
    pub fn new(engine: InferenceEngine, config: Config) -> Result<Self, PipelineError> {
        let aggregation = AggregationConfig::new(config.confidence_threshold)
            .map_err(PipelineError::Settings)?
            .with_precedence(config.method_precedence.clone());

        let reference_fingerprint = catalog_fingerprint(
            engine
                .catalog()
                .iter()
                .map(|entry| (entry.code.as_str(), entry.description.as_str())),
        );

        Ok(Self {
            engine,
            aggregator: Aggregator::new(aggregation),
            config,
            run_id: Uuid::new_v4(),
            reference_fingerprint,
        })
    }

    /// Replaces the generated run id, for reproducible output.
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    fn run_context(&self, text: &str) -> RunContext {
        RunContext::new(self.run_id, input_hash(text), Utc::now()).with_versions(
            self.config.reference_version.clone(),
            self.config.pipeline_version.clone(),
            self.config.aggregation_version.clone(),
        )
    }

    /// Processes one policy row.
    ///
    /// Empty or whitespace-only text skips the methods entirely and yields an empty result.
    pub async fn process_row(
        &self,
        row: &PolicyRow,
    ) -> Result<PolicyInferenceResult, PipelineError> {
        let text = normalize_policy_text(&row.policy_text);

        let output = if text.is_empty() {
            debug!(row = row.row_index, "Empty policy text, skipping methods");
            EngineOutput::default()
        } else {
            self.engine.run(&text).await
        };

        if output.all_failed(self.engine.method_count()) {
            warn!(row = row.row_index, "All methods failed for row");
        }

        let run = self.run_context(&text);
        let num_evidence = output.evidence.len();
        let evidence = self.config.include_evidence.then(|| output.evidence.clone());

        let aggregation = self
            .aggregator
            .aggregate(output.evidence, self.engine.catalog(), &run)
            .map_err(|source| PipelineError::Aggregation {
                row_index: row.row_index,
                source,
            })?;

        let audit = Audit {
            pipeline_version: run.pipeline_version,
            aggregation_version: run.aggregation_version,
            run_id: run.run_id,
            input_hash: run.input_hash,
            reference_version: run.reference_version,
            reference_fingerprint: self.reference_fingerprint.clone(),
            timestamp: run.timestamp,
            methods_configured: self
                .engine
                .method_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            num_evidence_collected: num_evidence,
            method_failures: output.failures,
        };

        Ok(PolicyInferenceResult {
            row_index: row.row_index,
            codes: aggregation.codes,
            summary: aggregation.summary,
            evidence,
            audit,
        })
    }

    /// Processes all rows with bounded concurrency, returning results in input order.
    ///
    /// Stops at the first row whose aggregation fails.
    pub async fn process_all(
        &self,
        rows: &[PolicyRow],
    ) -> Result<Vec<PolicyInferenceResult>, PipelineError> {
        info!(
            rows = rows.len(),
            methods = ?self.engine.method_names(),
            run_id = %self.run_id,
            concurrency = self.config.row_concurrency,
            "Processing policies"
        );

        let mut results = Vec::with_capacity(rows.len());
        let mut pending = stream::iter(rows)
            .map(|row| self.process_row(row))
            .buffered(self.config.row_concurrency.max(1));

        while let Some(result) = pending.next().await {
            results.push(result?);

            if results.len() % PROGRESS_LOG_INTERVAL == 0 {
                info!(processed = results.len(), total = rows.len(), "Progress");
            }
        }

        Ok(results)
    }
}
