//! Cross-cutting, shared constants.
//!
//! Defaults here seed [`Config`](crate::config::Config); modules that need a tunable value
//! take it from the config at construction rather than reading these directly.

/// Code system tag attached to every [`Evidence`](crate::evidence::Evidence) record.
pub const CODE_TYPE_HCPCS: &str = "HCPCS";

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.65;

pub const DEFAULT_REFERENCE_VERSION: &str = "hcpcs-reference-v1";

pub const DEFAULT_PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_AGGREGATION_VERSION: &str = "max-confidence-v1";

pub const DEFAULT_METHOD_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_ROW_CONCURRENCY: usize = 4;

/// Rows between progress log lines.
pub const PROGRESS_LOG_INTERVAL: usize = 10;

pub const DEFAULT_MODEL_NAME: &str = "llama-3.3-70b-versatile";

pub const DEFAULT_MODEL_PROVIDER: &str = "groq";

pub const DEFAULT_TOP_K_CODES: usize = 15;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.1;

/// Vocabulary cap for the TF-IDF candidate index.
pub const TFIDF_MAX_FEATURES: usize = 500;

/// Policy text sent to the external model is truncated to this many characters.
pub const MAX_MODEL_POLICY_CHARS: usize = 3000;

pub const DEFAULT_KEYWORD_MAX_TERMS: usize = 200;

pub const DEFAULT_KEYWORD_MIN_MATCHES: usize = 2;

/// Stop words removed before any lexical matching.
///
/// Includes the generic clinical filler words (`procedure`, `patient`, ...) that appear in
/// nearly every policy and would otherwise dominate matches.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "should", "could", "may", "might", "must", "can", "shall", "this",
    "that", "these", "those", "i", "you", "he", "she", "it", "we", "they", "what", "which", "who",
    "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most", "other",
    "some", "such", "than", "too", "very", "just", "only", "not", "any", "per", "into", "its",
    "their", "there", "also", "procedure", "service", "services", "treatment", "patient",
    "patients", "medical",
];

/// Built-in vocabulary of recognized clinical domain terms for the keyword method.
pub const DOMAIN_TERMS: &[&str] = &[
    "ambulance", "anesthesia", "angiography", "arthroscopy", "audiometry", "biopsy", "brace",
    "cane", "cardiac", "cast", "catheter", "chemotherapy", "cochlear", "colonoscopy", "compression",
    "contrast", "crutches", "defibrillator", "dialysis", "drug", "durable", "echocardiography",
    "electrode", "endoscopy", "enteral", "glucose", "hearing", "hospital", "imaging", "implant",
    "infusion", "injection", "insulin", "intravenous", "laboratory", "lens", "mammography",
    "monitor", "mri", "nebulizer", "nutrition", "orthosis", "orthotic", "ostomy", "oxygen",
    "parenteral", "pump", "prosthesis", "prosthetic", "radiation", "radiology", "rehabilitation",
    "screening", "splint", "stent", "surgical", "therapy", "transplant", "transport", "ultrasound",
    "vaccine", "ventilator", "walker", "wheelchair", "wound", "x-ray",
];
