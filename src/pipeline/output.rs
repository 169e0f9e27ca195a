use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::error::PipelineError;
use super::types::PolicyInferenceResult;

/// Writes results as a pretty-printed JSON array.
pub fn write_results_to<W: Write>(
    writer: W,
    results: &[PolicyInferenceResult],
) -> Result<(), PipelineError> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}

pub fn write_results(
    path: impl AsRef<Path>,
    results: &[PolicyInferenceResult],
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let write_err = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    write_results_to(&mut writer, results)?;
    writer.flush().map_err(write_err)?;

    info!(path = %path.display(), results = results.len(), "Results written");
    Ok(())
}
