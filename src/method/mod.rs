//! Scoring methods: pluggable strategies that turn policy text into [`Evidence`].
//!
//! Every method implements [`ScoringMethod`]. The engine holds methods as
//! `Arc<dyn ScoringMethod>` and never depends on a concrete type, so new variants plug in
//! without touching the engine or aggregator.
//!
//! # Contract
//!
//! - Every returned [`Evidence`] names a code present in the catalog passed to `infer`.
//! - `normalized_confidence` is in `[0.0, 1.0]`. A method that cannot normalize a score
//!   returns a [`MethodError`] instead of guessing.
//! - [`ScoringMethod::identity`] is constant for a configured instance.
//! - Methods never mutate the catalog and keep no state between calls beyond read-only
//!   indexes built at construction.

pub mod client;
pub mod error;
pub mod keyword;
pub mod llm;
pub mod model;
pub mod text;
pub mod tfidf;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


use async_trait::async_trait;

use crate::data::ReferenceCatalog;
use crate::evidence::{Evidence, MethodIdentity};

pub use client::{
    ModelCandidate, ModelClient, ModelClientError, ModelRequest, ModelResponse, ModelSelection,
};
pub use error::MethodError;
pub use keyword::{KeywordConfig, KeywordMethod};
pub use llm::GenaiModelClient;
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingMethod, MockModelClient, SlowMethod, StaticMethod};
pub use model::{ModelBackedMethod, ModelMethodConfig};
pub use tfidf::{SimilarCode, TfidfIndex};

#[async_trait]
/// A strategy that scores one policy text against the reference catalog.
pub trait ScoringMethod: Send + Sync {
    /// Identity stamped on every [`Evidence`] this method produces.
    fn identity(&self) -> &MethodIdentity;

    /// Produces zero or more findings for `policy_text`.
    async fn infer(
        &self,
        policy_text: &str,
        catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError>;

    /// Method name (shorthand for `identity().name`).
    fn name(&self) -> &str {
        &self.identity().name
    }
}
