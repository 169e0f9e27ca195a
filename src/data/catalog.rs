use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::DataError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of the reference code table.
pub struct ReferenceCode {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

impl ReferenceCode {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// Read-only catalog of reference codes with O(1) lookup by code.
///
/// Entry order is the load order and is preserved; methods that rank candidates rely on it
/// for stable tie-breaks.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    entries: Vec<ReferenceCode>,
    index: HashMap<String, usize>,
}

impl ReferenceCatalog {
    /// Builds a catalog, rejecting empty and duplicate codes.
    pub fn new(entries: Vec<ReferenceCode>) -> Result<Self, DataError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if entry.code.is_empty() {
                return Err(DataError::EmptyCode { record: position });
            }
            if index.insert(entry.code.clone(), position).is_some() {
                return Err(DataError::DuplicateCode {
                    code: entry.code.clone(),
                });
            }
        }

        Ok(Self { entries, index })
    }

    /// Parses `code,description` CSV records.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        if !headers.iter().any(|h| h == "code") {
            return Err(DataError::MissingColumn { column: "code" });
        }

        let entries = rdr
            .deserialize::<ReferenceCode>()
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ReferenceCode] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceCode> {
        self.entries.iter()
    }

    pub fn get(&self, code: &str) -> Option<&ReferenceCode> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }
}

impl<'a> IntoIterator for &'a ReferenceCatalog {
    type Item = &'a ReferenceCode;
    type IntoIter = std::slice::Iter<'a, ReferenceCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Loads the reference catalog from a CSV file. An empty catalog is an error.
pub fn load_reference_catalog(path: impl AsRef<Path>) -> Result<ReferenceCatalog, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = ReferenceCatalog::from_csv_reader(file)?;
    if catalog.is_empty() {
        return Err(DataError::EmptyCatalog);
    }

    info!(path = %path.display(), codes = catalog.len(), "Reference catalog loaded");
    Ok(catalog)
}
