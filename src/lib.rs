//! HCPCS procedure-code inference library (used by the `hcpcs-infer` binary and integration
//! tests).
//!
//! # Public API Surface
//!
//! A policy text flows through three stages:
//!
//! - [`InferenceEngine`] fans the text out to every configured [`ScoringMethod`] under a
//!   per-method timeout and collects an evidence pool. Failing methods are isolated.
//! - [`Aggregator`] groups the pool by code, keeps the maximum confidence, applies the
//!   threshold and ranks the survivors.
//! - [`Pipeline`] assembles one [`PolicyInferenceResult`] per input row with provenance and
//!   an audit block.
//!
//! ## Scoring Methods
//! - [`KeywordMethod`] - deterministic term overlap against code descriptions
//! - [`ModelBackedMethod`] - TF-IDF candidate narrowing plus an external [`ModelClient`]
//! - [`GenaiModelClient`] - production model client
//!
//! ## Inputs
//! - [`ReferenceCatalog`], [`load_reference_catalog`] - the closed code set
//! - [`PolicyRow`], [`load_policies`] - policy source
//!
//! ## Test/Mock Support
//! Mock methods and model clients are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod data;
pub mod engine;
pub mod evidence;
pub mod hashing;
pub mod method;
pub mod pipeline;

pub use aggregate::{
    Aggregation, AggregationConfig, AggregationError, Aggregator, FinalCode, MethodPrecedence,
    Provenance, RunContext, Summary,
};
pub use config::{Config, ConfigError};
pub use data::{
    DataError, PolicyRow, ReferenceCatalog, ReferenceCode, load_policies, load_reference_catalog,
};
pub use engine::{EngineError, EngineOutput, InferenceEngine, MethodFailure};
pub use evidence::{Evidence, MethodIdentity, MethodKind, ModelIdentity};
pub use hashing::{catalog_fingerprint, input_hash};
#[cfg(any(test, feature = "mock"))]
pub use method::{FailingMethod, MockModelClient, SlowMethod, StaticMethod};
pub use method::{
    GenaiModelClient, KeywordConfig, KeywordMethod, MethodError, ModelBackedMethod, ModelClient,
    ModelClientError, ModelMethodConfig, ScoringMethod,
};
pub use pipeline::{
    Audit, Pipeline, PipelineError, PolicyInferenceResult, RunStats, write_results,
};
