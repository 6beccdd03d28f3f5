//! Translation of failure paths into absolute document locations.
//!
//! Failure paths may address array elements by key (`rows[id=7]`) or as a
//! whole (`tags[]`). Tools that patch or highlight documents need positional
//! paths instead (`rows[3]`), resolved against the document that holds the
//! value.

use jsondiff_types::Value;
use serde::{Deserialize, Serialize};

use crate::result::{CompareResult, FailureKind};

/// Resolve `relative` against `root`, replacing every bracket selector with
/// the positional index it denotes.
///
/// Returns `None` when a segment does not exist in `root`. An empty segment
/// (as produced by escaped-document prefixes such as `payload..a`) ends the
/// walk and yields the path resolved so far. A multiset segment `name[]`
/// resolves to the array itself.
pub fn absolute_path(root: &Value, relative: &str) -> Option<String> {
    let mut resolved = String::new();
    let mut node = root;

    for (i, segment) in split_segments(relative).into_iter().enumerate() {
        if segment.is_empty() {
            return Some(resolved);
        }
        let (name, selectors) = parse_segment(segment)?;

        if !name.is_empty() {
            node = node.as_object()?.get(name)?;
            if !resolved.is_empty() {
                resolved.push('.');
            }
            resolved.push_str(name);
        } else if i > 0 {
            return None;
        }

        for selector in selectors {
            let items = node.as_array()?;
            if selector.is_empty() {
                continue;
            }
            let index = match selector.split_once('=') {
                Some((key, wanted)) => {
                    let parsed = wanted.parse::<Value>().ok();
                    items.iter().position(|item| {
                        item.as_object()
                            .and_then(|o| o.get(key))
                            .is_some_and(|v| id_matches(v, wanted, parsed.as_ref()))
                    })?
                }
                None => selector.parse::<usize>().ok()?,
            };
            node = items.get(index)?;
            resolved.push_str(&format!("[{index}]"));
        }
    }
    Some(resolved)
}

/// Ids are rendered with `to_plain_string`, so numbers must match by value
/// (`id=1` selects `1.0`) and strings by text (`id=7` selects `"7"`).
fn id_matches(id: &Value, wanted: &str, parsed: Option<&Value>) -> bool {
    match id {
        Value::Number(_) => parsed.is_some_and(|p| p == id),
        other => other.to_plain_string() == wanted,
    }
}

/// Split on `.` outside brackets.
fn split_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

/// `name[a][b]` into `("name", ["a", "b"])`.
fn parse_segment(segment: &str) -> Option<(&str, Vec<&str>)> {
    let (name, mut rest) = match segment.find('[') {
        Some(at) => (&segment[..at], &segment[at..]),
        None => return Some((segment, Vec::new())),
    };
    let mut selectors = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        selectors.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some((name, selectors))
}

// ---------------------------------------------------------------------------
// AbsolutePaths
// ---------------------------------------------------------------------------

/// One failure with its path resolved against each document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPath {
    pub kind: FailureKind,
    pub relative: String,
    /// Location in the expected document, when it exists there.
    pub expected: Option<String>,
    /// Location in the actual document, when it exists there.
    pub actual: Option<String>,
}

/// Absolute locations for every failure of a comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsolutePaths {
    pub entries: Vec<ResolvedPath>,
}

impl AbsolutePaths {
    /// Mismatch locations in the expected document.
    pub fn expected_failures(&self) -> Vec<&str> {
        self.collect(FailureKind::Mismatch, |e| e.expected.as_deref())
    }

    /// Mismatch locations in the actual document.
    pub fn actual_failures(&self) -> Vec<&str> {
        self.collect(FailureKind::Mismatch, |e| e.actual.as_deref())
    }

    /// Locations, in the expected document, of values absent from actual.
    pub fn missing(&self) -> Vec<&str> {
        self.collect(FailureKind::Missing, |e| e.expected.as_deref())
    }

    /// Locations, in the actual document, of values absent from expected.
    pub fn unexpected(&self) -> Vec<&str> {
        self.collect(FailureKind::Unexpected, |e| e.actual.as_deref())
    }

    fn collect<'a>(&'a self, kind: FailureKind, side: impl Fn(&'a ResolvedPath) -> Option<&'a str>) -> Vec<&'a str> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .filter_map(side)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve every failure path of `result`. Mismatches resolve against both
/// documents, Missing against `expected` only and Unexpected against
/// `actual` only. Paths that cannot be resolved are left as `None`.
pub fn resolve_absolute_paths(result: &CompareResult, expected: &Value, actual: &Value) -> AbsolutePaths {
    let entries = result
        .failures()
        .iter()
        .map(|failure| {
            let path = failure.path();
            let kind = failure.kind();
            let on_expected = matches!(kind, FailureKind::Mismatch | FailureKind::Missing);
            let on_actual = matches!(kind, FailureKind::Mismatch | FailureKind::Unexpected);
            let resolved = ResolvedPath {
                kind,
                relative: path.to_string(),
                expected: on_expected.then(|| absolute_path(expected, path)).flatten(),
                actual: on_actual.then(|| absolute_path(actual, path)).flatten(),
            };
            if (on_expected && resolved.expected.is_none()) || (on_actual && resolved.actual.is_none()) {
                tracing::debug!(path, "failure path did not resolve");
            }
            resolved
        })
        .collect();
    AbsolutePaths { entries }
}
