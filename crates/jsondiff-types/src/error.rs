use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("json parse error: {0}")]
    Parse(String),

    #[error("unknown compare mode: {0}")]
    UnknownMode(String),
}
