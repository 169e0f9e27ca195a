//! Evidence: one scoring method's finding for one code on one policy text.
//!
//! Evidence is created inside a single [`ScoringMethod`](crate::method::ScoringMethod) call
//! and never mutated afterwards. The engine collects it into a pool which is moved into the
//! [`Aggregator`](crate::aggregate::Aggregator) for reduction.

pub mod types;


pub use types::{Evidence, MethodIdentity, MethodKind, ModelIdentity};
