use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// Missing or unusable caller input. Reported, never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal invariant broken (malformed alignment ops, out-of-range component scores).
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Lexicon error: {0}")]
    Lexicon(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document extraction failed: {0}")]
    Extraction(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AuditResult<T> = Result<T, AuditError>;
