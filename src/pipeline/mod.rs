//! Result assembly: runs each policy row through engine and aggregator and produces one
//! [`PolicyInferenceResult`] per row, in input order.
//!
//! All rows of one invocation share a single `run_id`. Rows are independent and processed
//! with bounded concurrency; a contract violation detected while aggregating any row aborts
//! the run with that row's index.

pub mod error;
pub mod output;
pub mod runner;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::PipelineError;
pub use output::{write_results, write_results_to};
pub use runner::Pipeline;
pub use types::{Audit, PolicyInferenceResult, RunStats};
