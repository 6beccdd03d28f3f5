//! The recursive comparison walk.

use jsondiff_types::{CompareContext, Object, Value};

use crate::arrays::ArrayStrategy;
use crate::customization::{Customization, Customizations};
use crate::matcher::MatchFailure;
use crate::result::CompareResult;

/// Default bound on container nesting during a comparison.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Compares an expected document against an actual one under a policy and a
/// set of customizations.
///
/// The comparator holds no per-comparison state and can be shared across
/// threads; every comparison writes into its own [`CompareResult`].
#[derive(Clone, Debug)]
pub struct JsonComparator {
    policy: CompareContext,
    customizations: Customizations,
    max_depth: Option<usize>,
}

impl JsonComparator {
    pub fn new(policy: CompareContext) -> Self {
        Self {
            policy,
            customizations: Customizations::new(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    pub fn with_customizations(policy: CompareContext, customizations: impl Into<Customizations>) -> Self {
        Self {
            customizations: customizations.into(),
            ..Self::new(policy)
        }
    }

    /// Set the nesting bound. `None` disables it.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn add_customization(&mut self, customization: Customization) {
        self.customizations.push(customization);
    }

    pub fn policy(&self) -> &CompareContext {
        &self.policy
    }

    pub fn customizations(&self) -> &Customizations {
        &self.customizations
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// A comparator with a different policy and no customizations.
    pub fn scoped(&self, policy: CompareContext) -> Self {
        Self::new(policy).with_max_depth(self.max_depth)
    }

    /// Compare two documents from the root path.
    pub fn compare(&self, expected: &Value, actual: &Value) -> CompareResult {
        let mut result = CompareResult::for_policy(&self.policy);
        self.compare_values("", expected, actual, &mut result);
        tracing::debug!(
            passed = result.passed(),
            failures = result.len(),
            "comparison finished"
        );
        result
    }

    /// Compare a subtree in isolation, for trial matches that must not
    /// touch the caller's result. Depth carries over from `parent`.
    pub fn compare_nested(
        &self,
        parent: &CompareResult,
        path: &str,
        expected: &Value,
        actual: &Value,
    ) -> CompareResult {
        let mut result = CompareResult::for_policy(&self.policy);
        result.set_depth(parent.depth());
        self.compare_values(path, expected, actual, &mut result);
        result
    }

    /// Compare the values at `path`, consulting customizations first.
    pub fn compare_values(&self, path: &str, expected: &Value, actual: &Value, result: &mut CompareResult) {
        if let Some(customization) = self.customizations.find(path) {
            match customization.matches(path, actual, expected, result, self) {
                Ok(true) => {}
                Ok(false) => result.fail(path, expected.clone(), actual.clone()),
                Err(failure) => result.fail_with(path, failure),
            }
            return;
        }
        self.compare_default(path, expected, actual, result);
    }

    /// The built-in comparison at `path`, bypassing any customization bound
    /// to `path` itself. Children still see customizations.
    pub fn compare_default(&self, path: &str, expected: &Value, actual: &Value, result: &mut CompareResult) {
        match (expected, actual) {
            (Value::Number(e), Value::Number(a)) => {
                if e != a {
                    result.fail(path, expected.clone(), actual.clone());
                }
            }
            (Value::Object(e), Value::Object(a)) => {
                if self.enter(path, expected, actual, result) {
                    self.compare_object(path, e, a, result);
                    result.leave();
                }
            }
            (Value::Array(e), Value::Array(a)) => {
                if self.enter(path, expected, actual, result) {
                    self.compare_array_with(&self.policy, path, e, a, result);
                    result.leave();
                }
            }
            (e, a) if e.kind() == a.kind() => {
                if e != a {
                    result.fail(path, expected.clone(), actual.clone());
                }
            }
            _ => result.fail(path, expected.clone(), actual.clone()),
        }
    }

    /// Compare two objects key by key.
    pub fn compare_object(&self, path: &str, expected: &Object, actual: &Object, result: &mut CompareResult) {
        for (key, expected_value) in expected.iter() {
            if result.should_stop() {
                return;
            }
            let child = qualify(path, key);
            match actual.get(key) {
                Some(actual_value) => self.compare_values(&child, expected_value, actual_value, result),
                None => self.mark_missing(&child, expected_value, result),
            }
        }

        if self.policy.extensible {
            return;
        }
        for (key, actual_value) in actual.iter() {
            if result.should_stop() {
                return;
            }
            if !expected.contains_key(key) {
                self.mark_unexpected(&qualify(path, key), actual_value, result);
            }
        }
    }

    /// Compare two arrays, choosing the strategy from `policy` and the shape
    /// of the expected elements.
    pub fn compare_array_with(
        &self,
        policy: &CompareContext,
        path: &str,
        expected: &[Value],
        actual: &[Value],
        result: &mut CompareResult,
    ) {
        let strategy = ArrayStrategy::select(policy, expected, actual);
        tracing::debug!(path, ?strategy, "comparing arrays");
        match strategy {
            ArrayStrategy::StrictOrder => self.compare_strict_order(path, expected, actual, result),
            ArrayStrategy::Multiset => self.compare_multiset(path, expected, actual, result),
            ArrayStrategy::UniqueKey(key) => self.compare_by_unique_key(path, &key, expected, actual, result),
            ArrayStrategy::Greedy => self.compare_greedy(path, expected, actual, result, true),
        }
    }

    /// Record a missing value unless the path is ignored.
    pub fn mark_missing(&self, path: &str, expected: &Value, result: &mut CompareResult) {
        if !self.presence_suppressed(path) {
            result.missing(path, expected.clone());
        }
    }

    /// Record an unexpected value unless the path is ignored.
    pub fn mark_unexpected(&self, path: &str, actual: &Value, result: &mut CompareResult) {
        if !self.presence_suppressed(path) {
            result.unexpected(path, actual.clone());
        }
    }

    fn presence_suppressed(&self, path: &str) -> bool {
        self.customizations
            .find(path)
            .is_some_and(Customization::suppresses_presence)
    }

    fn enter(&self, path: &str, expected: &Value, actual: &Value, result: &mut CompareResult) -> bool {
        if let Some(max) = self.max_depth {
            if result.depth() >= max {
                result.fail_with(
                    path,
                    MatchFailure::new(
                        format!("maximum comparison depth ({max}) exceeded"),
                        expected.clone(),
                        actual.clone(),
                    ),
                );
                return false;
            }
        }
        result.enter();
        true
    }
}

/// Join a parent path and an object key.
pub fn qualify(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jsondiff_types::CompareMode;

    use super::*;
    use crate::matcher::{IgnorePathMatcher, TolerantValueMatcher};
    use crate::result::FailureKind;

    fn v(text: &str) -> Value {
        text.parse().unwrap()
    }

    fn run(mode: CompareMode, expected: &str, actual: &str) -> CompareResult {
        JsonComparator::new(mode.into()).compare(&v(expected), &v(actual))
    }

    fn paths(result: &CompareResult) -> Vec<(FailureKind, String)> {
        result
            .failures()
            .iter()
            .map(|f| (f.kind(), f.path().to_string()))
            .collect()
    }

    #[test]
    fn identical_documents_pass() {
        let doc = r#"{"a":[1,{"b":null}],"c":"x","d":true}"#;
        for mode in CompareMode::ALL {
            assert!(run(mode, doc, doc).passed(), "{mode}");
        }
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(run(CompareMode::Strict, r#"{"a":1}"#, r#"{"a":1.0}"#).passed());
        assert!(run(CompareMode::Strict, "[1e2]", "[100]").passed());
        assert!(run(CompareMode::Strict, r#"{"a":1}"#, r#"{"a":2}"#).failed());
    }

    #[test]
    fn kind_difference_is_a_mismatch() {
        let result = run(CompareMode::Strict, r#"{"a":1}"#, r#"{"a":"1"}"#);
        assert_eq!(paths(&result), vec![(FailureKind::Mismatch, "a".to_string())]);
    }

    #[test]
    fn root_scalar_mismatch_uses_empty_path() {
        let result = run(CompareMode::Strict, "1", "2");
        assert_eq!(result.message(), "\nExpected: 1\n     got: 2\n");
    }

    #[test]
    fn nested_paths_are_dotted() {
        let result = run(CompareMode::Strict, r#"{"a":{"b":{"c":1}}}"#, r#"{"a":{"b":{"c":2}}}"#);
        assert_eq!(paths(&result), vec![(FailureKind::Mismatch, "a.b.c".to_string())]);
    }

    #[test]
    fn missing_key_is_recorded() {
        let result = run(CompareMode::Lenient, r#"{"a":1,"b":2}"#, r#"{"a":1}"#);
        assert_eq!(paths(&result), vec![(FailureKind::Missing, "b".to_string())]);
    }

    #[test]
    fn extra_keys_depend_on_extensible() {
        assert!(run(CompareMode::Lenient, r#"{"a":1}"#, r#"{"a":1,"z":0}"#).passed());
        let result = run(CompareMode::NonExtensible, r#"{"a":1}"#, r#"{"a":1,"z":0}"#);
        assert_eq!(paths(&result), vec![(FailureKind::Unexpected, "z".to_string())]);
    }

    #[test]
    fn strict_order_reports_pairwise_then_excess() {
        let result = run(CompareMode::Strict, "[1,2,3]", "[1,2]");
        assert_eq!(paths(&result), vec![(FailureKind::Missing, "[2]".to_string())]);

        let result = run(CompareMode::Strict, r#"{"a":[1,9]}"#, r#"{"a":[1,2,3]}"#);
        assert_eq!(
            paths(&result),
            vec![
                (FailureKind::Mismatch, "a[1]".to_string()),
                (FailureKind::Unexpected, "a[2]".to_string()),
            ]
        );
    }

    #[test]
    fn ignore_null_suppresses_null_expectations() {
        let policy = CompareContext::from(CompareMode::Strict).with_ignore_null(true);
        let result = JsonComparator::new(policy).compare(&v(r#"{"a":null}"#), &v(r#"{"a":5}"#));
        assert!(result.passed());
    }

    #[test]
    fn fast_fail_records_one_failure_for_objects() {
        let policy = CompareContext::from(CompareMode::Strict).with_fast_fail(true);
        let result = JsonComparator::new(policy).compare(
            &v(r#"{"a":1,"b":2,"c":3}"#),
            &v(r#"{"a":0,"b":0,"c":0,"d":0}"#),
        );
        assert!(result.failed());
        assert!(result.should_stop());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn fast_fail_records_one_failure_for_arrays() {
        let policy = CompareContext::from(CompareMode::Lenient).with_fast_fail(true);
        let result = JsonComparator::new(policy).compare(&v("[1,2,3]"), &v("[4,5,6,7]"));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn customization_overrides_default_comparison() {
        let mut tolerant = TolerantValueMatcher::default();
        crate::matcher::ValueMatcher::init(&mut tolerant, "0.1", &CompareContext::default()).unwrap();
        let comparator = JsonComparator::with_customizations(
            CompareMode::Strict.into(),
            vec![Customization::new("**.price", Arc::new(tolerant)).unwrap()],
        );
        let result = comparator.compare(
            &v(r#"{"price":1.0,"items":[{"price":2.0}]}"#),
            &v(r#"{"price":1.05,"items":[{"price":2.5}]}"#),
        );
        assert_eq!(paths(&result), vec![(FailureKind::Mismatch, "items[0].price".to_string())]);
    }

    #[test]
    fn ignore_suppresses_presence_records() {
        let comparator = JsonComparator::with_customizations(
            CompareMode::Strict.into(),
            vec![Customization::new("**.secret", Arc::new(IgnorePathMatcher)).unwrap()],
        );
        // Missing
        assert!(comparator
            .compare(&v(r#"{"a":{"secret":1}}"#), &v(r#"{"a":{}}"#))
            .passed());
        // Unexpected
        assert!(comparator
            .compare(&v(r#"{"a":{}}"#), &v(r#"{"a":{"secret":1}}"#))
            .passed());
        // Mismatch
        assert!(comparator
            .compare(&v(r#"{"a":{"secret":1}}"#), &v(r#"{"a":{"secret":2}}"#))
            .passed());
    }

    #[test]
    fn depth_limit_is_reported_not_overflowed() {
        let mut deep = String::new();
        for _ in 0..20 {
            deep.push('[');
        }
        for _ in 0..20 {
            deep.push(']');
        }
        let comparator = JsonComparator::new(CompareMode::Strict.into()).with_max_depth(Some(5));
        let result = comparator.compare(&v(&deep), &v(&deep));
        assert!(result.failed());
        assert_eq!(result.len(), 1);
        assert!(result.failures()[0]
            .reason()
            .unwrap()
            .contains("maximum comparison depth (5)"));

        let unbounded = JsonComparator::new(CompareMode::Strict.into()).with_max_depth(None);
        assert!(unbounded.compare(&v(&deep), &v(&deep)).passed());
    }

    #[test]
    fn qualify_joins_with_dot() {
        assert_eq!(qualify("", "a"), "a");
        assert_eq!(qualify("a[0]", "b"), "a[0].b");
    }
}
