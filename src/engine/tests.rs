use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::data::{ReferenceCatalog, ReferenceCode};
use crate::evidence::{Evidence, MethodIdentity, MethodKind};
use crate::method::{FailingMethod, MethodError, ScoringMethod, SlowMethod, StaticMethod};

fn catalog() -> Arc<ReferenceCatalog> {
    Arc::new(
        ReferenceCatalog::new(vec![
            ReferenceCode::new("70551", "MRI brain without contrast"),
            ReferenceCode::new("99213", "Office visit"),
        ])
        .expect("valid catalog"),
    )
}

fn engine(methods: Vec<Arc<dyn ScoringMethod>>) -> InferenceEngine {
    InferenceEngine::new(methods, catalog(), Duration::from_secs(5)).expect("valid engine")
}

#[test]
fn test_new_rejects_empty_method_list() {
    let result = InferenceEngine::new(vec![], catalog(), Duration::from_secs(5));
    assert!(matches!(result, Err(EngineError::NoMethods)));
}

#[test]
fn test_new_rejects_duplicate_method_names() {
    let result = InferenceEngine::new(
        vec![
            Arc::new(StaticMethod::new("m1", MethodKind::Deterministic)),
            Arc::new(StaticMethod::new("m1", MethodKind::Model)),
        ],
        catalog(),
        Duration::from_secs(5),
    );
    assert!(matches!(result, Err(EngineError::DuplicateMethod { name }) if name == "m1"));
}

#[test]
fn test_new_rejects_zero_timeout() {
    let result = InferenceEngine::new(
        vec![Arc::new(StaticMethod::new("m1", MethodKind::Deterministic))],
        catalog(),
        Duration::ZERO,
    );
    assert!(matches!(result, Err(EngineError::ZeroTimeout)));
}

#[tokio::test]
async fn test_run_collects_union_in_registration_order() {
    let engine = engine(vec![
        Arc::new(StaticMethod::new("m1", MethodKind::Deterministic).with_finding("70551", 0.87)),
        Arc::new(
            StaticMethod::new("m2", MethodKind::Model)
                .with_finding("70551", 0.92)
                .with_finding("99213", 0.40),
        ),
    ]);

    let output = engine.run("MRI brain").await;

    assert!(output.failures.is_empty());
    let produced: Vec<_> = output
        .evidence
        .iter()
        .map(|e| (e.method.name.as_str(), e.code.as_str()))
        .collect();
    assert_eq!(
        produced,
        vec![("m1", "70551"), ("m2", "70551"), ("m2", "99213")]
    );
}

#[tokio::test]
async fn test_run_isolates_failing_method() {
    let engine = engine(vec![
        Arc::new(FailingMethod::new("broken", "malformed response")),
        Arc::new(StaticMethod::new("m1", MethodKind::Deterministic).with_finding("70551", 0.87)),
    ]);

    let output = engine.run("MRI brain").await;

    assert_eq!(output.evidence.len(), 1);
    assert_eq!(output.evidence[0].method.name, "m1");
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].method, "broken");
    assert!(output.failures[0].reason.contains("malformed response"));
    assert!(!output.all_failed(engine.method_count()));
}

#[tokio::test]
async fn test_run_all_methods_failing_yields_empty_pool() {
    let engine = engine(vec![
        Arc::new(FailingMethod::new("a", "down")),
        Arc::new(FailingMethod::new("b", "down")),
    ]);

    let output = engine.run("anything").await;

    assert!(output.evidence.is_empty());
    assert!(output.all_failed(engine.method_count()));
}

#[tokio::test]
async fn test_run_times_out_slow_method() {
    let slow = StaticMethod::new("slow", MethodKind::Model).with_finding("99213", 0.9);
    let engine = InferenceEngine::new(
        vec![
            Arc::new(SlowMethod::new(slow, Duration::from_secs(30))),
            Arc::new(
                StaticMethod::new("fast", MethodKind::Deterministic).with_finding("70551", 0.7),
            ),
        ],
        catalog(),
        Duration::from_millis(50),
    )
    .expect("valid engine");

    let output = engine.run("MRI brain").await;

    assert_eq!(output.evidence.len(), 1);
    assert_eq!(output.evidence[0].method.name, "fast");
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].method, "slow");
    assert!(output.failures[0].reason.contains("timed out"));
}

#[test]
fn test_engine_exposes_method_identities() {
    let engine = engine(vec![
        Arc::new(StaticMethod::new("m1", MethodKind::Deterministic)),
        Arc::new(StaticMethod::new("m2", MethodKind::Model)),
    ]);

    assert_eq!(engine.method_names(), vec!["m1", "m2"]);
    let identities = engine.method_identities();
    assert_eq!(identities[1].kind, MethodKind::Model);
    assert_eq!(engine.catalog().len(), 2);
}

struct MislabelledMethod {
    identity: MethodIdentity,
}

#[async_trait::async_trait]
impl ScoringMethod for MislabelledMethod {
    fn identity(&self) -> &MethodIdentity {
        &self.identity
    }

    async fn infer(
        &self,
        _policy_text: &str,
        _catalog: &ReferenceCatalog,
    ) -> Result<Vec<Evidence>, MethodError> {
        Err(MethodError::failed("someone_else", "boom"))
    }
}

#[tokio::test]
async fn test_failure_labelled_with_registered_method_name() {
    let engine = engine(vec![Arc::new(MislabelledMethod {
        identity: MethodIdentity::new("registered", "1.0", MethodKind::Deterministic),
    })]);

    let output = engine.run("anything").await;

    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].method, "registered");
    assert!(output.failures[0].reason.contains("boom"));
}
