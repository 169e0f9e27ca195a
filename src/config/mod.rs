//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `HCPCS_*` environment variables. The model-backed
//! method is enabled only when `GROQ_API_KEY` is present.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::aggregate::MethodPrecedence;
use crate::constants::{
    DEFAULT_AGGREGATION_VERSION, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_METHOD_TIMEOUT_SECS,
    DEFAULT_MODEL_NAME, DEFAULT_PIPELINE_VERSION, DEFAULT_REFERENCE_VERSION,
    DEFAULT_ROW_CONCURRENCY, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K_CODES,
};

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `HCPCS_*` overrides on top of defaults. The value is passed
/// explicitly into the engine, aggregator and pipeline; nothing reads process-wide state later.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum aggregated confidence a code needs to be reported. Default: `0.65`.
    pub confidence_threshold: f64,

    /// Reference-data version tag embedded in provenance.
    pub reference_version: String,

    /// Pipeline version tag embedded in provenance. Default: crate version.
    pub pipeline_version: String,

    /// Aggregation strategy version tag embedded in provenance.
    pub aggregation_version: String,

    /// Upper bound on a single method call for one policy. Default: 60s.
    pub method_timeout: Duration,

    /// Policies processed concurrently. Default: `4`.
    pub row_concurrency: usize,

    /// Tie-break order between method kinds on exactly equal confidence.
    pub method_precedence: MethodPrecedence,

    /// Model name handed to the external model client.
    pub model_name: String,

    /// Whether the model-backed method is configured (API key present).
    pub model_enabled: bool,

    /// Catalog candidates offered to the external model. Default: `15`.
    pub top_k_codes: usize,

    /// Minimum TF-IDF similarity for a catalog candidate. Default: `0.1`.
    pub similarity_threshold: f64,

    /// Include the raw evidence pool in each output record. Default: `true`.
    pub include_evidence: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            reference_version: DEFAULT_REFERENCE_VERSION.to_string(),
            pipeline_version: DEFAULT_PIPELINE_VERSION.to_string(),
            aggregation_version: DEFAULT_AGGREGATION_VERSION.to_string(),
            method_timeout: Duration::from_secs(DEFAULT_METHOD_TIMEOUT_SECS),
            row_concurrency: DEFAULT_ROW_CONCURRENCY,
            method_precedence: MethodPrecedence::default(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_enabled: false,
            top_k_codes: DEFAULT_TOP_K_CODES,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            include_evidence: true,
        }
    }
}

impl Config {
    const ENV_CONFIDENCE_THRESHOLD: &'static str = "HCPCS_CONFIDENCE_THRESHOLD";
    const ENV_REFERENCE_VERSION: &'static str = "HCPCS_REFERENCE_VERSION";
    const ENV_PIPELINE_VERSION: &'static str = "HCPCS_PIPELINE_VERSION";
    const ENV_AGGREGATION_VERSION: &'static str = "HCPCS_AGGREGATION_VERSION";
    const ENV_METHOD_TIMEOUT_SECS: &'static str = "HCPCS_METHOD_TIMEOUT_SECS";
    const ENV_ROW_CONCURRENCY: &'static str = "HCPCS_ROW_CONCURRENCY";
    const ENV_METHOD_PRECEDENCE: &'static str = "HCPCS_METHOD_PRECEDENCE";
    const ENV_MODEL: &'static str = "HCPCS_MODEL";
    const ENV_TOP_K_CODES: &'static str = "HCPCS_TOP_K_CODES";
    const ENV_SIMILARITY_THRESHOLD: &'static str = "HCPCS_SIMILARITY_THRESHOLD";
    const ENV_INCLUDE_EVIDENCE: &'static str = "HCPCS_INCLUDE_EVIDENCE";
    const ENV_API_KEY: &'static str = "GROQ_API_KEY";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let confidence_threshold = Self::parse_f64_from_env(
            Self::ENV_CONFIDENCE_THRESHOLD,
            defaults.confidence_threshold,
        )?;
        let similarity_threshold = Self::parse_f64_from_env(
            Self::ENV_SIMILARITY_THRESHOLD,
            defaults.similarity_threshold,
        )?;
        let method_precedence = Self::parse_precedence_from_env(defaults.method_precedence)?;

        let reference_version =
            Self::parse_string_from_env(Self::ENV_REFERENCE_VERSION, defaults.reference_version);
        let pipeline_version =
            Self::parse_string_from_env(Self::ENV_PIPELINE_VERSION, defaults.pipeline_version);
        let aggregation_version = Self::parse_string_from_env(
            Self::ENV_AGGREGATION_VERSION,
            defaults.aggregation_version,
        );
        let model_name = Self::parse_string_from_env(Self::ENV_MODEL, defaults.model_name);

        let method_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_METHOD_TIMEOUT_SECS,
            defaults.method_timeout.as_secs(),
        ));
        let row_concurrency =
            Self::parse_usize_from_env(Self::ENV_ROW_CONCURRENCY, defaults.row_concurrency);
        let top_k_codes = Self::parse_usize_from_env(Self::ENV_TOP_K_CODES, defaults.top_k_codes);
        let include_evidence =
            Self::parse_bool_from_env(Self::ENV_INCLUDE_EVIDENCE, defaults.include_evidence);

        let model_enabled = env::var(Self::ENV_API_KEY)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);

        Ok(Self {
            confidence_threshold,
            reference_version,
            pipeline_version,
            aggregation_version,
            method_timeout,
            row_concurrency,
            method_precedence,
            model_name,
            model_enabled,
            top_k_codes,
            similarity_threshold,
            include_evidence,
        })
    }

    /// Validates ranges and non-empty invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_unit_range("confidence threshold", self.confidence_threshold)?;
        Self::check_unit_range("similarity threshold", self.similarity_threshold)?;

        if self.method_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: "method timeout",
            });
        }
        if self.row_concurrency == 0 {
            return Err(ConfigError::ZeroValue {
                name: "row concurrency",
            });
        }
        if self.top_k_codes == 0 {
            return Err(ConfigError::ZeroValue {
                name: "top-k codes",
            });
        }

        for (name, value) in [
            ("reference version", &self.reference_version),
            ("pipeline version", &self.pipeline_version),
            ("aggregation version", &self.aggregation_version),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyVersion { name });
            }
        }

        Ok(())
    }

    /// Returns a copy with the confidence threshold replaced.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    fn check_unit_range(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::ThresholdOutOfRange { name, value })
        }
    }

    fn parse_f64_from_env(var_name: &'static str, default: f64) -> Result<f64, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::FloatParseError {
                    var: var_name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_precedence_from_env(
        default: MethodPrecedence,
    ) -> Result<MethodPrecedence, ConfigError> {
        match env::var(Self::ENV_METHOD_PRECEDENCE) {
            Ok(value) => value
                .parse()
                .map_err(|reason| ConfigError::InvalidPrecedence { value, reason }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        Self::parse_or_warn(var_name, default)
    }

    fn parse_usize_from_env(var_name: &str, default: usize) -> usize {
        Self::parse_or_warn(var_name, default)
    }

    fn parse_or_warn<T>(var_name: &str, default: T) -> T
    where
        T: FromStr + fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => match value.trim().parse() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!(
                        var = var_name,
                        value = %value,
                        default = %default,
                        "Unparseable value, using default"
                    );
                    default
                }
            },
            Err(_) => default,
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name) {
            Ok(v) => match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => default,
            },
            Err(_) => default,
        }
    }
}
