use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::AggregationError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("aggregation failed for row {row_index}: {source}")]
    Aggregation {
        row_index: usize,
        #[source]
        source: AggregationError,
    },

    #[error("invalid aggregation settings: {0}")]
    Settings(#[source] AggregationError),

    #[error("failed to write results to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}
