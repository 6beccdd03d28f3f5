//! Error types for rule loading and compilation.

use std::path::PathBuf;

use jsondiff_core::DiffError;
use thiserror::Error;

/// Errors raised while loading or compiling rule files.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule file could not be read.
    #[error("cannot read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rule file extension does not name a known format.
    #[error("unsupported rule file format: {path} (expected .yaml, .yml, .json or .toml)")]
    UnsupportedFormat { path: PathBuf },

    /// The rule document is malformed.
    #[error("{format} rule parse error: {reason}")]
    Parse { format: &'static str, reason: String },

    /// A selector expression is malformed.
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// A rule is structurally valid but cannot be used.
    #[error("rule {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    /// A custom rule names an unknown matcher or passes it a bad parameter.
    #[error("rule {index}: custom rule {name:?}: {source}")]
    Matcher {
        index: usize,
        name: String,
        #[source]
        source: DiffError,
    },
}

impl RuleError {
    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;
