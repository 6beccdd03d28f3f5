//! Pluggable value matchers.
//!
//! A matcher replaces the default comparison at the paths selected by a
//! [`Customization`](crate::Customization). Matchers are built by name from a
//! [`MatcherRegistry`], initialized once with a parameter string and the
//! active policy, then shared immutably across comparisons.

pub mod array;
pub mod basic;
pub mod escaped;
pub mod numeric;
pub mod registry;

use std::sync::Arc;

use jsondiff_types::number::parse_decimal;
use jsondiff_types::{CompareContext, Value};
use rust_decimal::Decimal;

use crate::comparator::JsonComparator;
use crate::error::{DiffError, DiffResult};
use crate::result::CompareResult;

pub use array::{ArrayDisorderMatcher, ArrayLengthMatcher, ArrayRecursivelyMatcher, ArrayWithKeyMatcher};
pub use basic::{ComparatorValueMatcher, EmptyValueMatcher, IgnorePathMatcher};
pub use escaped::EscapedJsonMatcher;
pub use numeric::{
    DegreePreciseMatcher, ImprecisePositionMatcher, NumberPreciseMatcher, PercentTolerantMatcher,
    TolerantValueMatcher,
};
pub use registry::{MatcherFactory, MatcherRegistry};

/// A shared, initialized matcher.
pub type MatcherHandle = Arc<dyn ValueMatcher>;

// ---------------------------------------------------------------------------
// MatchFailure
// ---------------------------------------------------------------------------

/// A matcher's explained rejection.
///
/// Recorded as a mismatch whose message is prefixed with `message`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MatchFailure {
    pub message: String,
    pub expected: Value,
    pub actual: Value,
}

impl MatchFailure {
    pub fn new(message: impl Into<String>, expected: Value, actual: Value) -> Self {
        Self {
            message: message.into(),
            expected,
            actual,
        }
    }
}

// ---------------------------------------------------------------------------
// ValueMatcher trait
// ---------------------------------------------------------------------------

/// Custom equality for the values at a path.
///
/// `equal` returns `Ok(true)` when the values agree, `Ok(false)` for a plain
/// mismatch, and `Err` for a mismatch with an explanation. Matchers that
/// recurse into children record nested failures in `result` themselves and
/// return `Ok(true)`.
pub trait ValueMatcher: Send + Sync {
    /// The registered name (e.g. `"TolerantValue"`).
    fn name(&self) -> &str;

    /// Configure from the customization's parameter string.
    fn init(&mut self, _param: &str, _policy: &CompareContext) -> DiffResult<()> {
        Ok(())
    }

    fn equal(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure>;

    /// Returns `true` if Missing/Unexpected records at matched paths are
    /// suppressed as well.
    fn suppresses_presence(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Split a parameter string into `(key, value)` pairs.
///
/// Whitespace is stripped first. Segments without `=` have no key.
pub(crate) fn param_pairs(param: &str, separators: &[char]) -> Vec<(Option<String>, String)> {
    let compact: String = param.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Vec::new();
    }
    compact
        .split(separators)
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (Some(key.to_ascii_lowercase()), value.to_string()),
            None => (None, segment.to_string()),
        })
        .collect()
}

/// Parse a non-negative decimal parameter.
pub(crate) fn decimal_param(matcher: &str, param: &str, raw: &str) -> DiffResult<Decimal> {
    let value = parse_decimal(raw)
        .ok_or_else(|| DiffError::init(matcher, param, format!("{raw:?} is not a number")))?;
    if value.is_sign_negative() {
        return Err(DiffError::init(matcher, param, "tolerance must not be negative"));
    }
    Ok(value)
}

/// The exact decimal behind a number or a numeric string.
pub(crate) fn decimal_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.as_decimal(),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// The float behind a number or a numeric string.
pub(crate) fn float_of(value: &Value) -> Option<f64> {
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    float.is_finite().then_some(float)
}
