//! Path-targeted matcher bindings.

use std::fmt;

use jsondiff_types::Value;

use crate::comparator::JsonComparator;
use crate::error::DiffResult;
use crate::matcher::{MatchFailure, MatcherHandle, ValueMatcher};
use crate::pattern::PathPattern;
use crate::result::CompareResult;

/// A path pattern bound to an initialized matcher.
#[derive(Clone)]
pub struct Customization {
    pattern: PathPattern,
    matcher: MatcherHandle,
}

impl Customization {
    pub fn new(pattern: &str, matcher: MatcherHandle) -> DiffResult<Self> {
        Ok(Self {
            pattern: PathPattern::compile(pattern)?,
            matcher,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn matcher(&self) -> &dyn ValueMatcher {
        self.matcher.as_ref()
    }

    pub fn applies_to_path(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    /// Run the bound matcher.
    pub fn matches(
        &self,
        path: &str,
        actual: &Value,
        expected: &Value,
        result: &mut CompareResult,
        comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        self.matcher.equal(path, actual, expected, result, comparator)
    }

    pub fn suppresses_presence(&self) -> bool {
        self.matcher.suppresses_presence()
    }
}

impl fmt::Debug for Customization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Customization")
            .field("pattern", &self.pattern.as_str())
            .field("matcher", &self.matcher.name())
            .finish()
    }
}

/// An ordered set of customizations. The first one whose pattern matches a
/// path wins.
#[derive(Clone, Debug, Default)]
pub struct Customizations {
    items: Vec<Customization>,
}

impl Customizations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, customization: Customization) {
        self.items.push(customization);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Customization> {
        self.items.iter()
    }

    /// The first customization that applies to `path`.
    pub fn find(&self, path: &str) -> Option<&Customization> {
        self.items.iter().find(|c| c.applies_to_path(path))
    }
}

impl From<Vec<Customization>> for Customizations {
    fn from(items: Vec<Customization>) -> Self {
        Self { items }
    }
}

impl FromIterator<Customization> for Customizations {
    fn from_iter<I: IntoIterator<Item = Customization>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Customization> for Customizations {
    fn extend<I: IntoIterator<Item = Customization>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}
