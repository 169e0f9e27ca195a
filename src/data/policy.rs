use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::DataError;

const POLICY_TEXT_COLUMN: &str = "policy_text";

#[derive(Deserialize)]
struct PolicyRecord {
    #[serde(default)]
    policy_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One input policy with its stable 0-based row index.
pub struct PolicyRow {
    pub row_index: usize,
    pub policy_text: String,
}

impl PolicyRow {
    pub fn new(row_index: usize, policy_text: impl Into<String>) -> Self {
        Self {
            row_index,
            policy_text: policy_text.into(),
        }
    }

    /// Parses CSV records carrying a `policy_text` column; other columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<Self>, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if !headers.iter().any(|h| h == POLICY_TEXT_COLUMN) {
            return Err(DataError::MissingColumn {
                column: POLICY_TEXT_COLUMN,
            });
        }

        rdr.deserialize::<PolicyRecord>()
            .enumerate()
            .map(|(row_index, record)| {
                let record = record?;
                Ok(PolicyRow::new(row_index, record.policy_text.unwrap_or_default()))
            })
            .collect()
    }
}

/// Loads policy rows from a CSV file.
pub fn load_policies(path: impl AsRef<Path>) -> Result<Vec<PolicyRow>, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = PolicyRow::from_csv_reader(file)?;
    info!(path = %path.display(), rows = rows.len(), "Policies loaded");
    Ok(rows)
}

/// Collapses whitespace runs to single spaces and trims the ends.
pub fn normalize_policy_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
