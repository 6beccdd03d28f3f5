//! Array comparison strategies.
//!
//! Strict-order arrays are compared index by index. Otherwise the shape of
//! the expected elements picks the strategy: all scalars compare as a
//! multiset, objects sharing a unique scalar key are joined on it, and
//! everything else falls back to a greedy first-match pairing.

use std::collections::HashMap;

use jsondiff_types::{CompareContext, Value};

use crate::comparator::JsonComparator;
use crate::result::CompareResult;

/// The strategy chosen for one array pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayStrategy {
    StrictOrder,
    Multiset,
    /// Join objects on the named key.
    UniqueKey(String),
    Greedy,
}

impl ArrayStrategy {
    pub fn select(policy: &CompareContext, expected: &[Value], actual: &[Value]) -> Self {
        if policy.strict_order {
            Self::StrictOrder
        } else if expected.iter().all(Value::is_scalar) {
            Self::Multiset
        } else if expected.iter().all(|e| e.as_object().is_some()) {
            find_unique_key(expected, actual).map_or(Self::Greedy, Self::UniqueKey)
        } else {
            Self::Greedy
        }
    }
}

/// The first key of the first expected object that identifies every element
/// on both sides.
///
/// A key qualifies when every element is an object holding a scalar under
/// it, values are distinct within each side, and the two sides share at
/// least one value (or one side is empty).
pub fn find_unique_key(expected: &[Value], actual: &[Value]) -> Option<String> {
    let first = expected.first()?.as_object()?;
    first
        .keys()
        .find(|key| {
            let (Ok(e), Ok(a)) = (
                KeyedElements::build(expected, key),
                KeyedElements::build(actual, key),
            ) else {
                return false;
            };
            e.is_empty() || a.is_empty() || e.ids().any(|id| a.contains(id))
        })
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// KeyedElements
// ---------------------------------------------------------------------------

/// Why an array cannot be indexed by a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyError {
    NotObject(usize),
    MissingKey(usize),
    NotScalar(usize),
    Duplicate(usize),
}

impl KeyError {
    pub fn describe(&self, key: &str) -> String {
        match self {
            Self::NotObject(i) => format!("element {i} is not an object"),
            Self::MissingKey(i) => format!("element {i} has no key {key:?}"),
            Self::NotScalar(i) => format!("element {i} has a non-scalar value for key {key:?}"),
            Self::Duplicate(i) => format!("element {i} repeats a value for key {key:?}"),
        }
    }
}

/// Array elements indexed by the scalar value they hold under one key.
pub struct KeyedElements<'a> {
    entries: Vec<(&'a Value, &'a Value)>,
    index: HashMap<&'a Value, usize>,
}

impl<'a> KeyedElements<'a> {
    pub fn build(items: &'a [Value], key: &str) -> Result<Self, KeyError> {
        let mut entries = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or(KeyError::NotObject(i))?;
            let id = object.get(key).ok_or(KeyError::MissingKey(i))?;
            if !id.is_scalar() {
                return Err(KeyError::NotScalar(i));
            }
            if index.insert(id, entries.len()).is_some() {
                return Err(KeyError::Duplicate(i));
            }
            entries.push((id, item));
        }
        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &Value) -> Option<&'a Value> {
        self.index.get(id).map(|&i| self.entries[i].1)
    }

    pub fn contains(&self, id: &Value) -> bool {
        self.index.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a Value> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// `(id, element)` pairs in array order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Value, &'a Value)> + '_ {
        self.entries.iter().copied()
    }
}

/// `path[key=value]`
pub fn keyed_path(path: &str, key: &str, id: &Value) -> String {
    format!("{path}[{key}={}]", id.to_plain_string())
}

/// Occurrence counts in order of first appearance.
fn occurrences(items: &[Value]) -> (Vec<&Value>, HashMap<&Value, usize>) {
    let mut order = Vec::new();
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }
    (order, counts)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

impl JsonComparator {
    pub(crate) fn compare_strict_order(
        &self,
        path: &str,
        expected: &[Value],
        actual: &[Value],
        result: &mut CompareResult,
    ) {
        let overlap = expected.len().min(actual.len());
        for i in 0..overlap {
            if result.should_stop() {
                return;
            }
            self.compare_values(&format!("{path}[{i}]"), &expected[i], &actual[i], result);
        }
        for (i, e) in expected.iter().enumerate().skip(overlap) {
            if result.should_stop() {
                return;
            }
            self.mark_missing(&format!("{path}[{i}]"), e, result);
        }
        for (i, a) in actual.iter().enumerate().skip(overlap) {
            if result.should_stop() {
                return;
            }
            self.mark_unexpected(&format!("{path}[{i}]"), a, result);
        }
    }

    pub(crate) fn compare_multiset(
        &self,
        path: &str,
        expected: &[Value],
        actual: &[Value],
        result: &mut CompareResult,
    ) {
        let child = format!("{path}[]");
        let (expected_order, expected_counts) = occurrences(expected);
        let (actual_order, actual_counts) = occurrences(actual);

        for value in expected_order {
            if result.should_stop() {
                return;
            }
            let wanted = expected_counts[value];
            match actual_counts.get(value) {
                None => self.mark_missing(&child, value, result),
                Some(&found) if found != wanted => result.fail(
                    child.as_str(),
                    Value::String(format!("{wanted} occurrence(s) of {}", value.to_plain_string())),
                    Value::String(format!("{found} occurrence(s)")),
                ),
                Some(_) => {}
            }
        }
        for value in actual_order {
            if result.should_stop() {
                return;
            }
            if !expected_counts.contains_key(value) {
                self.mark_unexpected(&child, value, result);
            }
        }
    }

    pub(crate) fn compare_by_unique_key(
        &self,
        path: &str,
        key: &str,
        expected: &[Value],
        actual: &[Value],
        result: &mut CompareResult,
    ) {
        match (KeyedElements::build(expected, key), KeyedElements::build(actual, key)) {
            (Ok(e), Ok(a)) => self.join_on_key(path, key, &e, &a, result, true),
            _ => self.compare_greedy(path, expected, actual, result, true),
        }
    }

    /// Pair elements that share a key value and compare each pair.
    pub fn join_on_key(
        &self,
        path: &str,
        key: &str,
        expected: &KeyedElements<'_>,
        actual: &KeyedElements<'_>,
        result: &mut CompareResult,
        report_unexpected: bool,
    ) {
        for (id, e) in expected.iter() {
            if result.should_stop() {
                return;
            }
            let child = keyed_path(path, key, id);
            match actual.get(id) {
                Some(a) => self.compare_values(&child, e, a, result),
                None => self.mark_missing(&child, e, result),
            }
        }
        if !report_unexpected {
            return;
        }
        for (id, a) in actual.iter() {
            if result.should_stop() {
                return;
            }
            if !expected.contains(id) {
                self.mark_unexpected(&keyed_path(path, key, id), a, result);
            }
        }
    }

    /// Pair each expected element with the first unclaimed actual element
    /// of the same kind that compares clean in isolation.
    ///
    /// No backtracking: an early greedy claim can leave a later expected
    /// element unmatched even when a perfect pairing exists.
    pub fn compare_greedy(
        &self,
        path: &str,
        expected: &[Value],
        actual: &[Value],
        result: &mut CompareResult,
        report_unexpected: bool,
    ) {
        let mut claimed = vec![false; actual.len()];
        for (i, e) in expected.iter().enumerate() {
            if result.should_stop() {
                return;
            }
            let child = format!("{path}[{i}]");
            let hit = actual.iter().enumerate().position(|(j, a)| {
                !claimed[j] && e.kind() == a.kind() && self.compare_nested(result, &child, e, a).passed()
            });
            match hit {
                Some(j) => claimed[j] = true,
                None => self.mark_missing(&child, e, result),
            }
        }
        if !report_unexpected {
            return;
        }
        for (j, a) in actual.iter().enumerate() {
            if result.should_stop() {
                return;
            }
            if !claimed[j] {
                self.mark_unexpected(&format!("{path}[{j}]"), a, result);
            }
        }
    }
}
