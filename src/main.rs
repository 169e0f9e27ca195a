//! `hcpcs-infer`: batch HCPCS code inference over a CSV of policy texts.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mimalloc::MiMalloc;

use hcpcs::config::Config;
use hcpcs::data::{load_policies, load_reference_catalog};
use hcpcs::engine::InferenceEngine;
use hcpcs::method::{
    GenaiModelClient, KeywordConfig, KeywordMethod, ModelBackedMethod, ModelMethodConfig,
    ScoringMethod,
};
use hcpcs::pipeline::{Pipeline, RunStats, write_results};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Infer HCPCS procedure codes for policy texts
#[derive(Parser)]
#[command(name = "hcpcs-infer")]
#[command(version, long_about = None)]
struct Cli {
    /// CSV file with a `policy_text` column
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file
    #[arg(short, long)]
    output: PathBuf,

    /// Reference catalog CSV with `code` and `description` columns
    #[arg(short, long, env = "HCPCS_REFERENCE_PATH", default_value = "hcpcs.csv")]
    reference: PathBuf,

    /// Override the confidence threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Run the keyword method only, even when a model API key is configured
    #[arg(long)]
    no_model: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = Config::from_env()?;
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    config.validate()?;

    let catalog = Arc::new(load_reference_catalog(&cli.reference)?);

    let mut methods: Vec<Arc<dyn ScoringMethod>> = vec![Arc::new(KeywordMethod::new(
        &catalog,
        KeywordConfig::default(),
    ))];

    if config.model_enabled && !cli.no_model {
        let client = Arc::new(GenaiModelClient::new(config.model_name.clone()));
        let model_config = ModelMethodConfig {
            top_k_codes: config.top_k_codes,
            similarity_threshold: config.similarity_threshold,
            ..ModelMethodConfig::default()
        };
        methods.push(Arc::new(ModelBackedMethod::new(&catalog, client, model_config)));
    } else {
        tracing::warn!("Model-backed method disabled, running keyword matching only");
    }

    let engine = InferenceEngine::new(methods, Arc::clone(&catalog), config.method_timeout)?;
    let pipeline = Pipeline::new(engine, config)?;

    tracing::info!(
        run_id = %pipeline.run_id(),
        methods = ?pipeline.engine().method_names(),
        threshold = pipeline.config().confidence_threshold,
        "HCPCS inference starting"
    );

    let rows = load_policies(&cli.input)?;
    let results = pipeline.process_all(&rows).await?;
    write_results(&cli.output, &results)?;

    let stats = RunStats::from_results(&results);
    tracing::info!(
        policies = stats.policies_processed,
        with_codes = stats.policies_with_codes,
        codes = stats.codes_inferred,
        evidence = stats.evidence_collected,
        method_failures = stats.method_failures,
        "HCPCS inference complete"
    );

    Ok(())
}
