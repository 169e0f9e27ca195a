//! Evidence aggregation: reduces an evidence pool to ranked, thresholded [`FinalCode`]s.
//!
//! # Algorithm
//!
//! 1. Validate every record against the method contract (known code, confidence in
//!    `[0.0, 1.0]`). Violations are surfaced as [`AggregationError`], never corrected.
//! 2. Group by exact, case-sensitive code.
//! 3. Pick each group's winner: highest `normalized_confidence`; on an exact tie the method
//!    kind ranked higher by [`MethodPrecedence`]; then the earliest record in collection order.
//! 4. Build the [`FinalCode`] from the winner. `contributing_methods` lists every method in the
//!    group, not only the winner.
//! 5. Drop codes strictly below the threshold.
//! 6. Sort by confidence descending, then code ascending.
//! 7. Summarize: surviving count, threshold, and methods behind the surviving codes only.
//!
//! The result is a pure function of the pool, catalog, configuration and [`RunContext`].

pub mod aggregator;
pub mod error;
pub mod types;


pub use aggregator::{AggregationConfig, Aggregator};
pub use error::AggregationError;
pub use types::{Aggregation, FinalCode, MethodPrecedence, Provenance, RunContext, Summary};
