use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::*;
use crate::config::Config;
use crate::data::{PolicyRow, ReferenceCatalog, ReferenceCode};
use crate::engine::InferenceEngine;
use crate::evidence::MethodKind;
use crate::method::{FailingMethod, ScoringMethod, StaticMethod};

fn catalog() -> Arc<ReferenceCatalog> {
    Arc::new(
        ReferenceCatalog::new(vec![
            ReferenceCode::new("70551", "MRI brain without contrast"),
            ReferenceCode::new("99213", "Office visit"),
            ReferenceCode::new("E0431", "Portable gaseous oxygen system"),
        ])
        .expect("valid catalog"),
    )
}

fn pipeline(methods: Vec<Arc<dyn ScoringMethod>>, config: Config) -> Pipeline {
    let engine =
        InferenceEngine::new(methods, catalog(), Duration::from_secs(5)).expect("valid engine");
    Pipeline::new(engine, config)
        .expect("valid pipeline")
        .with_run_id(Uuid::nil())
}

fn keyword_and_model() -> Vec<Arc<dyn ScoringMethod>> {
    vec![
        Arc::new(
            StaticMethod::new("keyword", MethodKind::Deterministic)
                .with_finding("70551", 0.87)
                .with_finding("99213", 0.40),
        ),
        Arc::new(StaticMethod::new("llm", MethodKind::Model).with_finding("70551", 0.92)),
    ]
}

#[tokio::test]
async fn test_process_row_assembles_codes_summary_and_audit() {
    let pipeline = pipeline(keyword_and_model(), Config::default());

    let result = pipeline
        .process_row(&PolicyRow::new(3, "MRI  of the brain\n"))
        .await
        .unwrap();

    assert_eq!(result.row_index, 3);
    assert_eq!(result.codes.len(), 1);
    assert_eq!(result.codes[0].code, "70551");
    assert_eq!(result.codes[0].aggregated_confidence, 0.92);
    assert_eq!(result.summary.total_codes_found, 1);
    assert_eq!(result.summary.threshold, 0.65);
    assert_eq!(result.summary.methods_used, vec!["keyword", "llm"]);

    let audit = &result.audit;
    assert_eq!(audit.run_id, Uuid::nil());
    assert_eq!(audit.input_hash, crate::hashing::input_hash("MRI of the brain"));
    assert_eq!(audit.methods_configured, vec!["keyword", "llm"]);
    assert_eq!(audit.num_evidence_collected, 3);
    assert!(audit.method_failures.is_empty());
    assert_eq!(audit.reference_fingerprint.len(), 64);

    assert_eq!(result.evidence.as_ref().map(Vec::len), Some(3));
    assert_eq!(result.codes[0].provenance.input_hash, audit.input_hash);
}

#[tokio::test]
async fn test_empty_text_skips_methods() {
    let pipeline = pipeline(
        vec![Arc::new(FailingMethod::new("broken", "should not run"))],
        Config::default(),
    );

    let result = pipeline.process_row(&PolicyRow::new(0, "   ")).await.unwrap();

    assert!(result.codes.is_empty());
    assert!(result.summary.methods_used.is_empty());
    assert_eq!(result.audit.num_evidence_collected, 0);
    assert!(result.audit.method_failures.is_empty());
}

#[tokio::test]
async fn test_failing_method_does_not_change_codes() {
    let baseline = pipeline(keyword_and_model(), Config::default())
        .process_row(&PolicyRow::new(0, "MRI brain"))
        .await
        .unwrap();

    let mut methods = keyword_and_model();
    methods.push(Arc::new(FailingMethod::new("broken", "upstream down")));
    let with_failure = pipeline(methods, Config::default())
        .process_row(&PolicyRow::new(0, "MRI brain"))
        .await
        .unwrap();

    let codes = |r: &PolicyInferenceResult| {
        r.codes
            .iter()
            .map(|c| (c.code.clone(), c.aggregated_confidence))
            .collect::<Vec<_>>()
    };
    assert_eq!(codes(&baseline), codes(&with_failure));
    assert_eq!(with_failure.audit.method_failures.len(), 1);
    assert_eq!(with_failure.audit.method_failures[0].method, "broken");
}

#[tokio::test]
async fn test_all_methods_failing_yields_empty_result() {
    let pipeline = pipeline(
        vec![
            Arc::new(FailingMethod::new("a", "down")),
            Arc::new(FailingMethod::new("b", "down")),
        ],
        Config::default(),
    );

    let result = pipeline.process_row(&PolicyRow::new(0, "oxygen")).await.unwrap();

    assert!(result.codes.is_empty());
    assert_eq!(result.audit.method_failures.len(), 2);
}

#[tokio::test]
async fn test_contract_violation_reports_row_index() {
    let pipeline = pipeline(
        vec![Arc::new(
            StaticMethod::new("rogue", MethodKind::Deterministic).with_finding("NOPE1", 0.9),
        )],
        Config::default(),
    );

    let rows = vec![PolicyRow::new(0, "first"), PolicyRow::new(1, "second")];
    let err = pipeline.process_all(&rows).await.unwrap_err();

    assert!(matches!(err, PipelineError::Aggregation { row_index: 0, .. }));
}

#[tokio::test]
async fn test_process_all_preserves_order_and_run_id() {
    let config = Config {
        row_concurrency: 3,
        ..Config::default()
    };
    let pipeline = pipeline(keyword_and_model(), config);

    let rows: Vec<PolicyRow> = (0..12)
        .map(|i| PolicyRow::new(i, format!("policy {}", i)))
        .collect();
    let results = pipeline.process_all(&rows).await.unwrap();

    let indices: Vec<usize> = results.iter().map(|r| r.row_index).collect();
    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert!(results.iter().all(|r| r.audit.run_id == Uuid::nil()));
}

#[tokio::test]
async fn test_lower_threshold_reports_more_codes() {
    let strict = pipeline(keyword_and_model(), Config::default())
        .process_row(&PolicyRow::new(0, "text"))
        .await
        .unwrap();
    let lenient = pipeline(keyword_and_model(), Config::default().with_threshold(0.3))
        .process_row(&PolicyRow::new(0, "text"))
        .await
        .unwrap();

    assert_eq!(strict.codes.len(), 1);
    assert_eq!(lenient.codes.len(), 2);
    assert_eq!(lenient.summary.threshold, 0.3);
}

#[tokio::test]
async fn test_evidence_omitted_when_disabled() {
    let config = Config {
        include_evidence: false,
        ..Config::default()
    };
    let result = pipeline(keyword_and_model(), config)
        .process_row(&PolicyRow::new(0, "text"))
        .await
        .unwrap();

    assert!(result.evidence.is_none());
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("evidence").is_none());
    assert_eq!(json["audit"]["num_evidence_collected"], 3);
}

#[test]
fn test_new_rejects_invalid_threshold() {
    let engine = InferenceEngine::new(keyword_and_model(), catalog(), Duration::from_secs(5))
        .expect("valid engine");
    let result = Pipeline::new(engine, Config::default().with_threshold(2.0));

    assert!(matches!(result, Err(PipelineError::Settings(_))));
}

#[tokio::test]
async fn test_run_stats_totals() {
    let mut methods = keyword_and_model();
    methods.push(Arc::new(FailingMethod::new("broken", "down")));
    let pipeline = pipeline(methods, Config::default());

    let rows = vec![PolicyRow::new(0, "a"), PolicyRow::new(1, ""), PolicyRow::new(2, "b")];
    let results = pipeline.process_all(&rows).await.unwrap();
    let stats = RunStats::from_results(&results);

    assert_eq!(stats.policies_processed, 3);
    assert_eq!(stats.policies_with_codes, 2);
    assert_eq!(stats.codes_inferred, 2);
    assert_eq!(stats.evidence_collected, 6);
    assert_eq!(stats.method_failures, 2);
}

#[tokio::test]
async fn test_write_results_produces_json_array() {
    let pipeline = pipeline(keyword_and_model(), Config::default());
    let results = pipeline
        .process_all(&[PolicyRow::new(0, "MRI")])
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.json");
    write_results(&path, &results).unwrap();

    let parsed: Vec<PolicyInferenceResult> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, results);
}

#[test]
fn test_write_results_reports_bad_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("results.json");

    let err = write_results(&path, &[]).unwrap_err();
    assert!(matches!(err, PipelineError::Write { .. }));
}
