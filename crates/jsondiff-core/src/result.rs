//! Comparison outcomes.
//!
//! A [`CompareResult`] accumulates [`FieldFailure`] records in discovery
//! order, each tagged with the path where the documents disagree.

use std::fmt;

use jsondiff_types::{CompareContext, Value};
use serde::{Deserialize, Serialize};

use crate::matcher::MatchFailure;

pub const REASON_MISMATCH: &str = "actual unequals to expected";
pub const REASON_MISSING: &str = "only in expected";
pub const REASON_UNEXPECTED: &str = "only in actual";

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// The three ways two documents can disagree at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Both sides hold a value and they differ.
    Mismatch,
    /// Only the expected document holds a value.
    Missing,
    /// Only the actual document holds a value.
    Unexpected,
}

impl FailureKind {
    /// The short reason string used in flat reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Mismatch => REASON_MISMATCH,
            Self::Missing => REASON_MISSING,
            Self::Unexpected => REASON_UNEXPECTED,
        }
    }
}

// ---------------------------------------------------------------------------
// FieldFailure
// ---------------------------------------------------------------------------

/// One recorded disagreement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldFailure {
    Mismatch {
        path: String,
        expected: Value,
        actual: Value,
        /// Set when a matcher explained its verdict.
        reason: Option<String>,
    },
    Missing {
        path: String,
        expected: Value,
    },
    Unexpected {
        path: String,
        actual: Value,
    },
}

impl FieldFailure {
    pub fn path(&self) -> &str {
        match self {
            Self::Mismatch { path, .. } | Self::Missing { path, .. } | Self::Unexpected { path, .. } => {
                path
            }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Mismatch { .. } => FailureKind::Mismatch,
            Self::Missing { .. } => FailureKind::Missing,
            Self::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// The expected side, absent for `Unexpected`.
    pub fn expected(&self) -> Option<&Value> {
        match self {
            Self::Mismatch { expected, .. } | Self::Missing { expected, .. } => Some(expected),
            Self::Unexpected { .. } => None,
        }
    }

    /// The actual side, absent for `Missing`.
    pub fn actual(&self) -> Option<&Value> {
        match self {
            Self::Mismatch { actual, .. } | Self::Unexpected { actual, .. } => Some(actual),
            Self::Missing { .. } => None,
        }
    }

    /// The matcher-supplied explanation, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Mismatch { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Flatten into a report entry.
    pub fn to_report_entry(&self) -> ReportEntry {
        ReportEntry {
            expected: self.expected().map(report_value),
            actual: self.actual().map(report_value),
            diff_key: self.path().to_string(),
            reason: match self.reason() {
                Some(reason) => format!("{reason}: {}", self.kind().reason()),
                None => self.kind().reason().to_string(),
            },
        }
    }
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch {
                path,
                expected,
                actual,
                reason,
            } => {
                match reason {
                    Some(reason) => writeln!(f, "{path}: {reason}")?,
                    None => writeln!(f, "{path}")?,
                }
                writeln!(f, "Expected: {}", describe(expected))?;
                writeln!(f, "     got: {}", describe(actual))
            }
            Self::Missing { path, expected } => {
                writeln!(f, "{path}")?;
                writeln!(f, "Expected: {}", describe(expected))?;
                writeln!(f, "     but none found")
            }
            Self::Unexpected { path, actual } => {
                writeln!(f, "{path}")?;
                writeln!(f, "Unexpected: {}", describe(actual))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ReportEntry
// ---------------------------------------------------------------------------

/// A flat, serializable view of one failure.
///
/// Scalars are kept as-is; containers are replaced by their shortened
/// description so reports stay readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub expected: Option<Value>,
    pub actual: Option<Value>,
    pub diff_key: String,
    pub reason: String,
}

fn report_value(value: &Value) -> Value {
    if value.is_scalar() {
        value.clone()
    } else {
        Value::String(describe(value))
    }
}

/// Human-readable rendering of a value for failure messages.
pub fn describe(value: &Value) -> String {
    match value {
        Value::Array(_) => format!("a JSON array: {}", shorten(&value.to_string())),
        Value::Object(_) => format!("a JSON object: {}", shorten(&value.to_string())),
        other => other.to_plain_string(),
    }
}

/// Keep the head and tail of long renderings.
pub fn shorten(text: &str) -> String {
    let count = text.chars().count();
    if count <= 100 {
        return text.to_string();
    }
    let head: String = text.chars().take(60).collect();
    let tail: String = text.chars().skip(count - 40).collect();
    format!("{head}<...>{tail}")
}

// ---------------------------------------------------------------------------
// CompareResult
// ---------------------------------------------------------------------------

/// Accumulated outcome of one comparison.
///
/// `complete` and `quick_fail` are independent: `complete == false` asks the
/// comparison to stop at the first failure, and `quick_fail` reports that it
/// has done so.
#[derive(Clone, Debug)]
pub struct CompareResult {
    success: bool,
    complete: bool,
    quick_fail: bool,
    ignore_null: bool,
    messages: Vec<String>,
    failures: Vec<FieldFailure>,
    depth: usize,
}

impl CompareResult {
    /// A passing result that records every failure.
    pub fn new() -> Self {
        Self {
            success: true,
            complete: true,
            quick_fail: false,
            ignore_null: false,
            messages: Vec::new(),
            failures: Vec::new(),
            depth: 0,
        }
    }

    /// A passing result seeded from the policy's `fast_fail` and
    /// `ignore_null` flags.
    pub fn for_policy(policy: &CompareContext) -> Self {
        let mut result = Self::new();
        result.complete = !policy.fast_fail;
        result.ignore_null = policy.ignore_null;
        result
    }

    /// Returns `true` if no failure was recorded.
    pub fn passed(&self) -> bool {
        self.success
    }

    pub fn failed(&self) -> bool {
        !self.success
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Returns `true` once a failure was recorded in fast-fail mode.
    pub fn should_stop(&self) -> bool {
        self.quick_fail
    }

    pub fn ignores_null(&self) -> bool {
        self.ignore_null
    }

    pub fn set_ignore_null(&mut self, ignore_null: bool) {
        self.ignore_null = ignore_null;
    }

    /// All failure messages joined with `" ; "`.
    pub fn message(&self) -> String {
        self.messages.join(" ; ")
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<FieldFailure> {
        self.failures
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &FieldFailure> {
        self.of_kind(FailureKind::Mismatch)
    }

    pub fn missing_fields(&self) -> impl Iterator<Item = &FieldFailure> {
        self.of_kind(FailureKind::Missing)
    }

    pub fn unexpected_fields(&self) -> impl Iterator<Item = &FieldFailure> {
        self.of_kind(FailureKind::Unexpected)
    }

    fn of_kind(&self, kind: FailureKind) -> impl Iterator<Item = &FieldFailure> {
        self.failures.iter().filter(move |f| f.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record a value mismatch. Skipped when null expectations are ignored
    /// and `expected` is `null`.
    pub fn fail(&mut self, path: impl Into<String>, expected: Value, actual: Value) {
        if self.ignore_null && expected.is_null() {
            return;
        }
        self.record(FieldFailure::Mismatch {
            path: path.into(),
            expected,
            actual,
            reason: None,
        });
    }

    /// Record a mismatch explained by a matcher.
    pub fn fail_with(&mut self, path: impl Into<String>, failure: MatchFailure) {
        self.record(FieldFailure::Mismatch {
            path: path.into(),
            expected: failure.expected,
            actual: failure.actual,
            reason: Some(failure.message),
        });
    }

    /// Record a value present only in the expected document.
    pub fn missing(&mut self, path: impl Into<String>, expected: Value) {
        self.record(FieldFailure::Missing {
            path: path.into(),
            expected,
        });
    }

    /// Record a value present only in the actual document.
    pub fn unexpected(&mut self, path: impl Into<String>, actual: Value) {
        self.record(FieldFailure::Unexpected {
            path: path.into(),
            actual,
        });
    }

    fn record(&mut self, failure: FieldFailure) {
        if self.quick_fail {
            return;
        }
        self.success = false;
        if !self.complete {
            self.quick_fail = true;
        }
        self.messages.push(failure.to_string());
        self.failures.push(failure);
    }

    /// Flatten every failure into a report entry.
    pub fn to_report(&self) -> Vec<ReportEntry> {
        self.failures.iter().map(FieldFailure::to_report_entry).collect()
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for CompareResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompareResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Value {
        text.parse().unwrap()
    }

    #[test]
    fn new_result_passes() {
        let result = CompareResult::new();
        assert!(result.passed());
        assert!(result.is_complete());
        assert!(!result.should_stop());
        assert!(result.is_empty());
        assert_eq!(result.message(), "");
    }

    #[test]
    fn mismatch_message_format() {
        let mut result = CompareResult::new();
        result.fail("a.b", v("1"), v("2"));
        assert!(result.failed());
        assert_eq!(result.message(), "a.b\nExpected: 1\n     got: 2\n");
    }

    #[test]
    fn missing_and_unexpected_message_format() {
        let mut result = CompareResult::new();
        result.missing("a", v("\"x\""));
        result.unexpected("b", v("null"));
        assert_eq!(
            result.message(),
            "a\nExpected: x\n     but none found\n ; b\nUnexpected: null\n"
        );
        assert_eq!(result.missing_fields().count(), 1);
        assert_eq!(result.unexpected_fields().count(), 1);
        assert_eq!(result.mismatches().count(), 0);
    }

    #[test]
    fn matcher_reason_prefixes_message() {
        let mut result = CompareResult::new();
        result.fail_with(
            "n",
            MatchFailure::new("array length differs", Value::from(2usize), Value::from(3usize)),
        );
        assert_eq!(
            result.message(),
            "n: array length differs\nExpected: 2\n     got: 3\n"
        );
        assert_eq!(result.failures()[0].reason(), Some("array length differs"));
    }

    #[test]
    fn matcher_reason_prefixes_report_entry() {
        let mut result = CompareResult::new();
        result.fail_with(
            "n",
            MatchFailure::new("array length differs", Value::from(2usize), Value::from(3usize)),
        );
        result.fail("m", v("1"), v("2"));
        let report = result.to_report();
        assert_eq!(report[0].reason, "array length differs: actual unequals to expected");
        assert_eq!(report[1].reason, "actual unequals to expected");
    }

    #[test]
    fn containers_are_described() {
        assert_eq!(describe(&v("[1,2]")), "a JSON array: [1,2]");
        assert_eq!(describe(&v(r#"{"a":1}"#)), r#"a JSON object: {"a":1}"#);
        assert_eq!(describe(&v("null")), "null");
    }

    #[test]
    fn long_renderings_are_shortened() {
        let text = "x".repeat(150);
        let short = shorten(&text);
        assert_eq!(short.len(), 60 + 5 + 40);
        assert!(short.contains("<...>"));
        assert_eq!(shorten("short"), "short");
    }

    #[test]
    fn ignore_null_skips_null_expectations() {
        let mut result = CompareResult::for_policy(&CompareContext::default().with_ignore_null(true));
        result.fail("a", Value::Null, v("1"));
        assert!(result.passed());
        result.fail("b", v("1"), Value::Null);
        assert!(result.failed());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn fast_fail_keeps_only_first_failure() {
        let mut result = CompareResult::for_policy(&CompareContext::default().with_fast_fail(true));
        assert!(!result.is_complete());
        result.fail("a", v("1"), v("2"));
        assert!(result.should_stop());
        result.missing("b", v("1"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn report_entries_flatten_failures() {
        let mut result = CompareResult::new();
        result.fail("a", v("1"), v("[1]"));
        result.missing("b", v("\"x\""));
        result.unexpected("c", v("true"));

        let report = result.to_report();
        assert_eq!(report.len(), 3);
        assert_eq!(report[0].reason, REASON_MISMATCH);
        assert_eq!(report[0].expected, Some(v("1")));
        assert_eq!(report[0].actual, Some(Value::from("a JSON array: [1]")));
        assert_eq!(report[1].reason, REASON_MISSING);
        assert_eq!(report[1].actual, None);
        assert_eq!(report[2].reason, REASON_UNEXPECTED);
        assert_eq!(report[2].diff_key, "c");
    }

    #[test]
    fn report_serializes_camel_case() {
        let mut result = CompareResult::new();
        result.unexpected("c", v("1"));
        let json = serde_json::to_string(&result.to_report()).unwrap();
        assert_eq!(
            json,
            r#"[{"expected":null,"actual":1,"diffKey":"c","reason":"only in actual"}]"#
        );
    }
}
