//! A small JSONPath subset for picking and pruning subtrees.
//!
//! Supported steps: `$` (root), `.name`, `['name']`, `["name"]`, `[n]`
//! (negative counts from the end), `[*]` and `.*`. The leading `$` may be
//! omitted (`orders[0].lines`).

use std::fmt;

use jsondiff_types::Value;

use crate::error::{RuleError, RuleResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Key(String),
    Index(i64),
    Wildcard,
}

/// A parsed selector.
#[derive(Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    steps: Vec<Step>,
}

impl Selector {
    pub fn parse(source: &str) -> RuleResult<Self> {
        let text = source.trim();
        let mut rest = text.strip_prefix('$').unwrap_or(text);
        let mut steps = Vec::new();

        // A bare leading name: `orders.lines`.
        if !rest.is_empty() && !rest.starts_with(['.', '[']) {
            let (name, tail) = split_name(rest);
            steps.push(Step::Key(name.to_string()));
            rest = tail;
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('.') {
                if after.starts_with('.') {
                    return Err(RuleError::selector(source, "recursive descent (..) is not supported"));
                }
                if let Some(tail) = after.strip_prefix('*') {
                    steps.push(Step::Wildcard);
                    rest = tail;
                    continue;
                }
                let (name, tail) = split_name(after);
                if name.is_empty() {
                    return Err(RuleError::selector(source, "empty member name"));
                }
                steps.push(Step::Key(name.to_string()));
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('[') {
                let (step, tail) = parse_bracket(source, after)?;
                steps.push(step);
                rest = tail;
            } else {
                return Err(RuleError::selector(source, format!("unexpected input at {rest:?}")));
            }
        }

        Ok(Self {
            source: text.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// `true` when the selector can match at most one node.
    pub fn is_definite(&self) -> bool {
        !self.steps.contains(&Step::Wildcard)
    }

    /// Every node the selector matches, in document order.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut frontier = vec![root];
        for step in &self.steps {
            frontier = frontier
                .into_iter()
                .flat_map(|node| children(node, step))
                .collect();
        }
        frontier
    }

    /// The subtree to compare: the single match of a definite selector, or
    /// an array of all matches of a wildcard one. `None` when nothing
    /// matches.
    pub fn read(&self, root: &Value) -> Option<Value> {
        let matches = self.select(root);
        if self.is_definite() {
            return matches.first().map(|v| (*v).clone());
        }
        if matches.is_empty() {
            return None;
        }
        Some(Value::Array(matches.into_iter().cloned().collect()))
    }

    /// Delete every matched node. Returns how many were removed. The root
    /// itself is never removed.
    pub fn remove(&self, root: &mut Value) -> usize {
        remove_at(root, &self.steps)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({})", self.source)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn split_name(text: &str) -> (&str, &str) {
    let end = text.find(['.', '[']).unwrap_or(text.len());
    text.split_at(end)
}

/// Parse the inside of `[...]`; `text` starts just after the `[`.
fn parse_bracket<'a>(source: &str, text: &'a str) -> RuleResult<(Step, &'a str)> {
    if let Some(tail) = text.strip_prefix("*]") {
        return Ok((Step::Wildcard, tail));
    }
    if let Some(quote) = text.chars().next().filter(|c| *c == '\'' || *c == '"') {
        let body = &text[1..];
        let close = body
            .find(quote)
            .ok_or_else(|| RuleError::selector(source, "unterminated quoted name"))?;
        let tail = body[close + 1..]
            .strip_prefix(']')
            .ok_or_else(|| RuleError::selector(source, "expected ] after quoted name"))?;
        return Ok((Step::Key(body[..close].to_string()), tail));
    }
    let close = text
        .find(']')
        .ok_or_else(|| RuleError::selector(source, "unterminated bracket"))?;
    let index = text[..close]
        .trim()
        .parse::<i64>()
        .map_err(|_| RuleError::selector(source, format!("invalid index {:?}", &text[..close])))?;
    Ok((Step::Index(index), &text[close + 1..]))
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index < 0 {
        len.checked_sub(index.unsigned_abs() as usize)
    } else {
        let index = index as usize;
        (index < len).then_some(index)
    }
}

fn children<'a>(node: &'a Value, step: &Step) -> Vec<&'a Value> {
    match (step, node) {
        (Step::Key(key), Value::Object(object)) => object.get(key).into_iter().collect(),
        (Step::Index(index), Value::Array(items)) => resolve_index(*index, items.len())
            .and_then(|i| items.get(i))
            .into_iter()
            .collect(),
        (Step::Wildcard, Value::Object(object)) => object.values().collect(),
        (Step::Wildcard, Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

fn remove_at(node: &mut Value, steps: &[Step]) -> usize {
    let Some((step, rest)) = steps.split_first() else {
        return 0;
    };

    if rest.is_empty() {
        return match (step, node) {
            (Step::Key(key), Value::Object(object)) => usize::from(object.remove(key).is_some()),
            (Step::Index(index), Value::Array(items)) => match resolve_index(*index, items.len()) {
                Some(i) => {
                    items.remove(i);
                    1
                }
                None => 0,
            },
            (Step::Wildcard, Value::Object(object)) => {
                let keys: Vec<String> = object.keys().map(str::to_string).collect();
                for key in &keys {
                    object.remove(key);
                }
                keys.len()
            }
            (Step::Wildcard, Value::Array(items)) => {
                let count = items.len();
                items.clear();
                count
            }
            _ => 0,
        };
    }

    match (step, node) {
        (Step::Key(key), Value::Object(object)) => object
            .get_mut(key)
            .map_or(0, |child| remove_at(child, rest)),
        (Step::Index(index), Value::Array(items)) => resolve_index(*index, items.len())
            .and_then(|i| items.get_mut(i))
            .map_or(0, |child| remove_at(child, rest)),
        (Step::Wildcard, Value::Object(object)) => {
            object.values_mut().map(|child| remove_at(child, rest)).sum()
        }
        (Step::Wildcard, Value::Array(items)) => {
            items.iter_mut().map(|child| remove_at(child, rest)).sum()
        }
        _ => 0,
    }
}
