//! Matchers that change how arrays are compared.

use std::borrow::Cow;

use jsondiff_types::{CompareContext, Value};

use super::{param_pairs, MatchFailure, ValueMatcher};
use crate::arrays::KeyedElements;
use crate::comparator::JsonComparator;
use crate::error::{DiffError, DiffResult};
use crate::result::CompareResult;

/// The actual side must be an array.
fn actual_array<'a>(matcher: &str, actual: &'a Value, expected: &Value) -> Result<&'a [Value], MatchFailure> {
    actual.as_array().map(Vec::as_slice).ok_or_else(|| {
        MatchFailure::new(
            format!("{matcher} expects an array, got {}", actual.kind()),
            expected.clone(),
            actual.clone(),
        )
    })
}

/// A non-array expectation is treated as a one-element array.
fn expected_elements(expected: &Value) -> Cow<'_, [Value]> {
    match expected {
        Value::Array(items) => Cow::Borrowed(items.as_slice()),
        other => Cow::Owned(vec![other.clone()]),
    }
}

// ---------------------------------------------------------------------------
// ArrayLength
// ---------------------------------------------------------------------------

/// Passes when both arrays have the same length, ignoring content.
#[derive(Debug, Default)]
pub struct ArrayLengthMatcher;

impl ValueMatcher for ArrayLengthMatcher {
    fn name(&self) -> &str {
        "ArrayLength"
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        let actual_items = actual_array(self.name(), actual, expected)?;
        let expected_items = expected_elements(expected);
        if actual_items.len() != expected_items.len() {
            return Err(MatchFailure::new(
                format!(
                    "array length differs: expected {} element(s), got {}",
                    expected_items.len(),
                    actual_items.len()
                ),
                Value::from(expected_items.len()),
                Value::from(actual_items.len()),
            ));
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ArrayWithKey
// ---------------------------------------------------------------------------

/// Joins object elements on a caller-named key.
///
/// Parameter: `key` or `k=key`. Unexpected elements are reported unless the
/// policy is extensible.
#[derive(Debug, Default)]
pub struct ArrayWithKeyMatcher {
    key: String,
    extensible: bool,
}

impl ArrayWithKeyMatcher {
    fn index<'a>(
        &self,
        items: &'a [Value],
        side: &str,
        expected: &Value,
        actual: &Value,
    ) -> Result<KeyedElements<'a>, MatchFailure> {
        KeyedElements::build(items, &self.key).map_err(|e| {
            MatchFailure::new(
                format!("cannot key {side} array: {}", e.describe(&self.key)),
                expected.clone(),
                actual.clone(),
            )
        })
    }
}

impl ValueMatcher for ArrayWithKeyMatcher {
    fn name(&self) -> &str {
        "ArrayWithKey"
    }

    fn init(&mut self, param: &str, policy: &CompareContext) -> DiffResult<()> {
        let key = param_pairs(param, &[',', ';'])
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .unwrap_or_default();
        if key.is_empty() {
            return Err(DiffError::init(self.name(), param, "a key name is required"));
        }
        self.key = key;
        self.extensible = policy.extensible;
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
        let actual_items = actual_array(self.name(), actual, expected)?;
        let expected_items = expected_elements(expected);
        let expected_index = self.index(&expected_items, "expected", expected, actual)?;
        let actual_index = self.index(actual_items, "actual", expected, actual)?;
        comparator.join_on_key(path, &self.key, &expected_index, &actual_index, result, !self.extensible);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ArrayDisorder
// ---------------------------------------------------------------------------

/// Compares the array without regard to order, whatever the policy says.
#[derive(Debug, Default)]
pub struct ArrayDisorderMatcher;

impl ValueMatcher for ArrayDisorderMatcher {
    fn name(&self) -> &str {
        "ArrayDisorder"
    }

    fn equal(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        let actual_items = actual_array(self.name(), actual, expected)?;
        let expected_items = expected_elements(expected);
        let local = CompareContext::new(false, false, false, false);
        comparator.compare_array_with(&local, path, &expected_items, actual_items, result);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// ArrayRecursively
// ---------------------------------------------------------------------------

/// Greedy element pairing with full recursive comparison of each pair.
///
/// Parameter: optional `true`/`false` (or `extensible=...`) overriding the
/// policy's extensible flag. When extensible, surplus actual elements are
/// not reported.
#[derive(Debug, Default)]
pub struct ArrayRecursivelyMatcher {
    extensible: bool,
}

impl ValueMatcher for ArrayRecursivelyMatcher {
    fn name(&self) -> &str {
        "ArrayRecursively"
    }

    fn init(&mut self, param: &str, policy: &CompareContext) -> DiffResult<()> {
        self.extensible = match param_pairs(param, &[',', ';']).into_iter().next() {
            None => policy.extensible,
            Some((_, value)) => value
                .to_ascii_lowercase()
                .parse()
                .map_err(|_| DiffError::init(self.name(), param, "expected true or false"))?,
        };
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
        let actual_items = actual_array(self.name(), actual, expected)?;
        let expected_items = expected_elements(expected);
        comparator.compare_greedy(path, &expected_items, actual_items, result, !self.extensible);
        Ok(true)
    }
}
