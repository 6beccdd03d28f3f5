//! Error types for the comparison engine.
//!
//! Only misconfiguration is an error. Disagreements between the expected and
//! actual documents are recorded in a [`CompareResult`](crate::CompareResult).

/// Errors raised while building comparators and customizations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A customization names a matcher that is not registered.
    #[error("unknown matcher: {name}")]
    UnknownMatcher { name: String },

    /// A matcher rejected its parameter string.
    #[error("invalid parameter {param:?} for matcher {matcher}: {reason}")]
    MatcherInit {
        matcher: String,
        param: String,
        reason: String,
    },

    /// A path pattern could not be compiled.
    #[error("invalid path pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl DiffError {
    /// Create a matcher initialization error.
    pub fn init(
        matcher: impl Into<String>,
        param: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MatcherInit {
            matcher: matcher.into(),
            param: param.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for engine results.
pub type DiffResult<T> = Result<T, DiffError>;
