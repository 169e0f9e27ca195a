//! Input collaborators: the reference code catalog and the policy source.
//!
//! Both are loaded once, before any row is processed. The catalog is immutable for the
//! lifetime of a run and is shared read-only (`Arc<ReferenceCatalog>`) by every method and row.

pub mod catalog;
pub mod error;
pub mod policy;


pub use catalog::{ReferenceCatalog, ReferenceCode, load_reference_catalog};
pub use error::DataError;
pub use policy::{PolicyRow, load_policies, normalize_policy_text};
