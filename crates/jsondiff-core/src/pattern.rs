//! Path patterns used to target customizations.
//!
//! Paths are dotted keys with bracketed array segments, e.g. `a.b[0].c`,
//! `a.b[id=7].c` or `a.b[]`. Patterns use three wildcards:
//!
//! - `**.` matches zero or more leading `segment.` groups
//! - `**` matches one or more arbitrary characters
//! - `*` matches one or more characters other than `.`
//!
//! `$` matches only the root path (the empty string).

use std::fmt;

use regex::Regex;

use crate::error::{DiffError, DiffResult};

/// A compiled path pattern.
#[derive(Clone)]
pub struct PathPattern {
    source: String,
    tier: MatchTier,
}

#[derive(Clone)]
enum MatchTier {
    /// `$`
    Root,
    /// `**.<literal>`: a plain suffix test, no regex involved.
    Suffix(String),
    /// `**.<...>*<suffix>`: cheap suffix rejection before the full regex.
    SuffixThenRegex { suffix: String, regex: Regex },
    Regex(Regex),
}

impl PathPattern {
    /// Compile a pattern. Literal text is escaped, so any input compiles
    /// unless the resulting expression exceeds the regex size limits.
    pub fn compile(pattern: &str) -> DiffResult<Self> {
        let tier = if pattern == "$" {
            MatchTier::Root
        } else if let Some(rest) = pattern.strip_prefix("**.").filter(|r| !r.is_empty()) {
            match rest.rfind('*') {
                None => MatchTier::Suffix(rest.to_string()),
                Some(star) => MatchTier::SuffixThenRegex {
                    suffix: rest[star + 1..].to_string(),
                    regex: build_regex(pattern)?,
                },
            }
        } else {
            MatchTier::Regex(build_regex(pattern)?)
        };

        Ok(Self {
            source: pattern.to_string(),
            tier,
        })
    }

    /// The pattern text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `path` is selected by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match &self.tier {
            MatchTier::Root => path.is_empty(),
            MatchTier::Suffix(suffix) => {
                path == suffix
                    || path
                        .strip_suffix(suffix.as_str())
                        .is_some_and(|head| head.ends_with('.'))
            }
            MatchTier::SuffixThenRegex { suffix, regex } => {
                path.ends_with(suffix.as_str()) && regex.is_match(path)
            }
            MatchTier::Regex(regex) => regex.is_match(path),
        }
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Translate a pattern into an anchored regular expression.
///
/// Splitting keeps empty fragments, so a trailing `**` still contributes
/// its wildcard.
fn regex_source(pattern: &str) -> String {
    let body = pattern
        .split("**.")
        .map(|deep| {
            deep.split("**")
                .map(|any| {
                    any.split('*')
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"[^.]+")
                })
                .collect::<Vec<_>>()
                .join(".+")
        })
        .collect::<Vec<_>>()
        .join(r"(?:.+\.)?");
    format!("^(?:{body})$")
}

fn build_regex(pattern: &str) -> DiffResult<Regex> {
    Regex::new(&regex_source(pattern)).map_err(|e| DiffError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathPattern {
        PathPattern::compile(s).unwrap()
    }

    #[test]
    fn root_pattern_matches_only_empty_path() {
        assert!(p("$").matches(""));
        assert!(!p("$").matches("a"));
    }

    #[test]
    fn deep_suffix_matches_at_any_depth() {
        let pat = p("**.id");
        assert!(pat.matches("id"));
        assert!(pat.matches("a.id"));
        assert!(pat.matches("a.b[0].id"));
        assert!(!pat.matches("aid"));
        assert!(!pat.matches("a.bid"));
        assert!(!pat.matches("id.x"));
    }

    #[test]
    fn single_star_stays_within_one_segment() {
        let pat = p("a.*.c");
        assert!(pat.matches("a.b.c"));
        assert!(!pat.matches("a.b.d.c"));
        assert!(!pat.matches("a..c"));
    }

    #[test]
    fn double_star_spans_segments() {
        let pat = p("a.**");
        assert!(pat.matches("a.b"));
        assert!(pat.matches("a.b.c[2]"));
        assert!(!pat.matches("a"));
    }

    #[test]
    fn inner_deep_wildcard_is_optional() {
        let pat = p("a.**.b");
        assert!(pat.matches("a.b"));
        assert!(pat.matches("a.x.y.b"));
        assert!(!pat.matches("a.xb"));
    }

    #[test]
    fn array_segments_are_matched_by_star() {
        let pat = p("items[*].price");
        assert!(pat.matches("items[0].price"));
        assert!(pat.matches("items[id=7].price"));
        assert!(!pat.matches("items.price"));
    }

    #[test]
    fn deep_pattern_with_inner_star_checks_suffix_and_regex() {
        let pat = p("**.items[*].id");
        assert!(pat.matches("items[3].id"));
        assert!(pat.matches("order.items[sku=A].id"));
        assert!(!pat.matches("order.items[3].name"));
        assert!(!pat.matches("order.things[3].id"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let pat = p("a+b.(c)");
        assert!(pat.matches("a+b.(c)"));
        assert!(!pat.matches("aab.c"));
    }

    #[test]
    fn plain_pattern_requires_full_match() {
        let pat = p("a.b");
        assert!(pat.matches("a.b"));
        assert!(!pat.matches("x.a.b"));
        assert!(!pat.matches("a.b.c"));
    }

    #[test]
    fn regex_source_translation() {
        assert_eq!(regex_source("**.a"), r"^(?:(?:.+\.)?a)$");
        assert_eq!(regex_source("a.*"), r"^(?:a\.[^.]+)$");
        assert_eq!(regex_source("a**"), r"^(?:a.+)$");
    }
}
