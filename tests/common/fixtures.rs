//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use hcpcs::aggregate::RunContext;
use hcpcs::data::{ReferenceCatalog, ReferenceCode};
use hcpcs::evidence::{Evidence, MethodIdentity, MethodKind};

pub const CATALOG_CSV: &str = "\
code,description
E0431,Portable gaseous oxygen system rental
E1130,Standard wheelchair with fixed full length arms
70551,MRI brain without contrast material
99213,Office outpatient visit established
";

pub const POLICIES_CSV: &str = "\
policy_id,policy_text
P-1,\"Portable oxygen system is covered for home use, subject to review.\"
P-2,MRI of the brain with contrast
P-3,
P-4,Office visit
";

pub const CODES: &[&str] = &["E0431", "E1130", "70551", "99213"];

pub fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::new(vec![
        ReferenceCode::new("E0431", "Portable gaseous oxygen system rental"),
        ReferenceCode::new("E1130", "Standard wheelchair with fixed full length arms"),
        ReferenceCode::new("70551", "MRI brain without contrast material"),
        ReferenceCode::new("99213", "Office outpatient visit established"),
    ])
    .expect("valid catalog")
}

pub fn run_context() -> RunContext {
    RunContext::new(
        Uuid::nil(),
        hcpcs::hashing::input_hash("fixture"),
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    )
    .with_versions("hcpcs-reference-v1", "0.1.0", "max-confidence-v1")
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

pub struct EvidenceBuilder {
    code: String,
    confidence: f64,
    method: String,
    kind: MethodKind,
}

impl EvidenceBuilder {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            confidence: 0.5,
            method: "keyword_match".to_string(),
            kind: MethodKind::Deterministic,
        }
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn method(mut self, name: &str, kind: MethodKind) -> Self {
        self.method = name.to_string();
        self.kind = kind;
        self
    }

    pub fn build(self) -> Evidence {
        Evidence::new(
            self.code.clone(),
            MethodIdentity::new(self.method, "test", self.kind),
            self.confidence,
            self.confidence,
            format!("fixture evidence for {}", self.code),
        )
    }
}
