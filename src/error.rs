use thiserror::Error;

/// Rule text that could not be read as an integer literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("rule text is empty")]
    Empty,
    #[error("invalid integer literal: {0:?}")]
    InvalidLiteral(String),
}

/// Rejected grid or engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid side must be at least 1, got {0}")]
    InvalidSize(usize),
    #[error("history capacity must be at least 1")]
    ZeroHistory,
    #[error("history capacity {0} exceeds the limit")]
    HistoryTooLarge(usize),
    #[error(transparent)]
    Rule(#[from] DecodeError),
}
