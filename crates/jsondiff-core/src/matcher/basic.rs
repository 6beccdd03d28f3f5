//! General-purpose matchers.

use jsondiff_types::{CompareContext, CompareMode, Value};

use super::{param_pairs, MatchFailure, ValueMatcher};
use crate::comparator::JsonComparator;
use crate::error::{DiffError, DiffResult};
use crate::result::CompareResult;

// ---------------------------------------------------------------------------
// IgnorePath
// ---------------------------------------------------------------------------

/// Accepts anything, including absence on either side.
#[derive(Debug, Default)]
pub struct IgnorePathMatcher;

impl ValueMatcher for IgnorePathMatcher {
    fn name(&self) -> &str {
        "IgnorePath"
    }

    fn equal(
        &self,
        _path: &str,
        _actual: &Value,
        _expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        Ok(true)
    }

    fn suppresses_presence(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// EmptyValue
// ---------------------------------------------------------------------------

/// `null`, `""`, `[]` and `{}` are interchangeable. Any other pair goes
/// through the default comparison.
#[derive(Debug, Default)]
pub struct EmptyValueMatcher;

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

impl ValueMatcher for EmptyValueMatcher {
    fn name(&self) -> &str {
        "EmptyValue"
    }

    fn equal(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        if !(is_empty(actual) && is_empty(expected)) {
            comparator.compare_default(path, expected, actual, result);
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ComparatorValue
// ---------------------------------------------------------------------------

/// Re-compares the subtree under a different policy preset.
///
/// Parameter: a mode name (`STRICT`, `LENIENT`, `NON_EXTENSIBLE`,
/// `STRICT_ORDER`), optionally as `mode=...`. Defaults to `STRICT_ORDER`.
/// The scoped comparison sees no customizations.
#[derive(Debug)]
pub struct ComparatorValueMatcher {
    policy: CompareContext,
}

impl Default for ComparatorValueMatcher {
    fn default() -> Self {
        Self {
            policy: CompareMode::StrictOrder.into(),
        }
    }
}

impl ValueMatcher for ComparatorValueMatcher {
    fn name(&self) -> &str {
        "ComparatorValue"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        if let Some((_, raw)) = param_pairs(param, &[',', ';']).into_iter().next() {
            let mode: CompareMode = raw
                .parse()
                .map_err(|e: jsondiff_types::TypeError| DiffError::init(self.name(), param, e.to_string()))?;
            self.policy = mode.into();
        }
        Ok(())
    }

    fn equal(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        comparator
            .scoped(self.policy)
            .compare_values(path, expected, actual, result);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::customization::Customization;
    use crate::result::FailureKind;

    fn v(text: &str) -> Value {
        text.parse().unwrap()
    }

    fn comparator_with(mode: CompareMode, pattern: &str, matcher: Arc<dyn ValueMatcher>) -> JsonComparator {
        JsonComparator::with_customizations(mode.into(), vec![Customization::new(pattern, matcher).unwrap()])
    }

    #[test]
    fn ignore_path_accepts_anything() {
        let comparator = comparator_with(CompareMode::Strict, "**.ts", Arc::new(IgnorePathMatcher));
        assert!(comparator
            .compare(&v(r#"{"ts":1,"n":{"ts":"a"}}"#), &v(r#"{"ts":[],"n":{"ts":null}}"#))
            .passed());
    }

    #[test]
    fn ignore_path_at_root_accepts_any_document() {
        let comparator = comparator_with(CompareMode::Strict, "$", Arc::new(IgnorePathMatcher));
        assert!(comparator.compare(&v("[1,2]"), &v(r#"{"x":1}"#)).passed());
    }

    #[test]
    fn empty_values_are_interchangeable() {
        let comparator = comparator_with(CompareMode::Strict, "**.note", Arc::new(EmptyValueMatcher));
        for (e, a) in [("null", r#""""#), ("[]", "{}"), (r#""""#, "[]"), ("{}", "null")] {
            let expected = v(&format!(r#"{{"note":{e}}}"#));
            let actual = v(&format!(r#"{{"note":{a}}}"#));
            assert!(comparator.compare(&expected, &actual).passed(), "{e} vs {a}");
        }
    }

    #[test]
    fn empty_value_falls_back_to_default_comparison() {
        let comparator = comparator_with(CompareMode::Strict, "note", Arc::new(EmptyValueMatcher));
        assert!(comparator
            .compare(&v(r#"{"note":"hi"}"#), &v(r#"{"note":"hi"}"#))
            .passed());

        let result = comparator.compare(&v(r#"{"note":{"a":1}}"#), &v(r#"{"note":{"a":2}}"#));
        let paths: Vec<_> = result.failures().iter().map(|f| (f.kind(), f.path())).collect();
        assert_eq!(paths, vec![(FailureKind::Mismatch, "note.a")]);

        assert!(comparator.compare(&v(r#"{"note":""}"#), &v(r#"{"note":"x"}"#)).failed());
    }

    #[test]
    fn comparator_value_uses_scoped_mode() {
        let mut matcher = ComparatorValueMatcher::default();
        matcher.init("LENIENT", &CompareContext::default()).unwrap();
        let comparator = comparator_with(CompareMode::Strict, "bag", Arc::new(matcher));

        assert!(comparator
            .compare(&v(r#"{"bag":[1,2,3]}"#), &v(r#"{"bag":[3,2,1]}"#))
            .passed());
        assert!(comparator
            .compare(&v(r#"{"bag":{"a":1}}"#), &v(r#"{"bag":{"a":1,"extra":true}}"#))
            .passed());
        assert!(comparator
            .compare(&v(r#"{"list":[1,2]}"#), &v(r#"{"list":[2,1]}"#))
            .failed());
    }

    #[test]
    fn comparator_value_rejects_unknown_mode() {
        let mut matcher = ComparatorValueMatcher::default();
        let err = matcher.init("mode=SLOPPY", &CompareContext::default()).unwrap_err();
        assert!(err.to_string().contains("ComparatorValue"));
    }
}
