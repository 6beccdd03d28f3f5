//! Comparison of JSON documents embedded as strings.

use jsondiff_types::Value;

use super::{MatchFailure, ValueMatcher};
use crate::comparator::JsonComparator;
use crate::result::CompareResult;

/// Parses string values as JSON and compares the resulting trees at
/// `path.`. Text that does not parse is compared as text.
#[derive(Debug, Default)]
pub struct EscapedJsonMatcher;

/// Parse a value that may carry serialized JSON, unwrapping nested
/// serialized containers along the way.
pub fn parse_embedded(value: &Value) -> Option<Value> {
    let parsed = match value {
        Value::String(text) => text.parse::<Value>().ok()?,
        other => other.clone(),
    };
    Some(unwrap_nested(parsed))
}

/// Replace string values that hold serialized objects or arrays with the
/// parsed structure, recursively.
fn unwrap_nested(value: Value) -> Value {
    match value {
        Value::String(text) => {
            let trimmed = text.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                if let Ok(inner) = text.parse::<Value>() {
                    return unwrap_nested(inner);
                }
            }
            Value::String(text)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_nested).collect()),
        Value::Object(mut object) => {
            for child in object.values_mut() {
                let taken = std::mem::take(child);
                *child = unwrap_nested(taken);
            }
            Value::Object(object)
        }
        scalar => scalar,
    }
}

impl ValueMatcher for EscapedJsonMatcher {
    fn name(&self) -> &str {
        "EscapedJson"
    }

    fn equal(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        match (parse_embedded(expected), parse_embedded(actual)) {
            (Some(e), Some(a)) => {
                comparator.compare_values(&format!("{path}."), &e, &a, result);
                Ok(true)
            }
            _ => Ok(expected.to_plain_string() == actual.to_plain_string()),
        }
    }
}
