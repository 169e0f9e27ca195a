use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no scoring methods configured")]
    NoMethods,

    #[error("duplicate scoring method name: {name}")]
    DuplicateMethod { name: String },

    #[error("method timeout must be greater than zero")]
    ZeroTimeout,
}
