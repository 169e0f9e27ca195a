//! Inference engine: fans one policy text out to every configured scoring method.
//!
//! Methods run concurrently, each under its own timeout. A failing or timed-out method is
//! recorded as a [`MethodFailure`] and excluded from the pool; the others are unaffected.
//! The engine never retries; retry policy belongs to the method.

pub mod error;
pub mod executor;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EngineError;
pub use executor::InferenceEngine;
pub use types::{EngineOutput, MethodFailure};
