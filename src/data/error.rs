use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("duplicate reference code: {code}")]
    DuplicateCode { code: String },

    #[error("reference code at record {record} is empty")]
    EmptyCode { record: usize },

    #[error("reference catalog contains no codes")]
    EmptyCatalog,
}
