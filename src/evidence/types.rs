use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::CODE_TYPE_HCPCS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Type-tag of a scoring method, used for tie-break precedence.
pub enum MethodKind {
    /// Purely deterministic (lexical, rule-based) scoring.
    Deterministic,
    /// Backed by an external model call.
    Model,
}

impl MethodKind {
    /// Returns the stable serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Deterministic => "deterministic",
            MethodKind::Model => "model",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deterministic" | "lexical" | "keyword" => Ok(Self::Deterministic),
            "model" | "llm" => Ok(Self::Model),
            other => Err(format!("unknown method kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Immutable identity of a configured scoring method.
pub struct MethodIdentity {
    pub name: String,
    pub version: String,
    pub kind: MethodKind,
}

impl MethodIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind,
        }
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// External model that backed a finding, with token accounting when the provider reports it.
pub struct ModelIdentity {
    pub name: String,
    pub provider: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl ModelIdentity {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            prompt_tokens: None,
            completion_tokens: None,
            total_tokens: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One method's finding for one code.
///
/// `normalized_confidence` is the cross-method comparison value and must lie in `[0.0, 1.0]`;
/// `raw_confidence` is whatever scale the producing method uses internally.
pub struct Evidence {
    pub code: String,
    pub code_type: String,
    pub raw_confidence: f64,
    pub normalized_confidence: f64,
    pub justification: String,
    /// Ordered reasoning steps. `None` for methods that do not expose structured reasoning.
    pub decision_trace: Option<Vec<String>>,
    pub method: MethodIdentity,
    pub model: Option<ModelIdentity>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Evidence {
    pub fn new(
        code: impl Into<String>,
        method: MethodIdentity,
        normalized_confidence: f64,
        raw_confidence: f64,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            code_type: CODE_TYPE_HCPCS.to_string(),
            raw_confidence,
            normalized_confidence,
            justification: justification.into(),
            decision_trace: None,
            method,
            model: None,
            metadata: Map::new(),
        }
    }

    pub fn with_decision_trace(mut self, trace: Vec<String>) -> Self {
        self.decision_trace = Some(trace);
        self
    }

    pub fn with_model(mut self, model: ModelIdentity) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if `normalized_confidence` is finite and within `[0.0, 1.0]`.
    pub fn has_valid_confidence(&self) -> bool {
        self.normalized_confidence.is_finite()
            && (0.0..=1.0).contains(&self.normalized_confidence)
    }
}
