//! Terminal rendering of comparison failures.

use colored::Colorize;
use jsondiff_core::result::describe;
use jsondiff_core::{FieldFailure, ResolvedPath};
use jsondiff_types::Value;
use similar::{ChangeTag, TextDiff};

/// A single line in a string diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Line diff of two multi-line strings, in hunks with one line of context.
pub fn line_diff(expected: &str, actual: &str) -> Vec<Vec<DiffLine>> {
    let text_diff = TextDiff::from_lines(expected, actual);
    text_diff
        .grouped_ops(1)
        .iter()
        .map(|hunk| {
            hunk.iter()
                .flat_map(|op| text_diff.iter_changes(op))
                .map(|change| {
                    let text = change.value().trim_end_matches('\n').to_string();
                    match change.tag() {
                        ChangeTag::Equal => DiffLine::Context(text),
                        ChangeTag::Delete => DiffLine::Removed(text),
                        ChangeTag::Insert => DiffLine::Added(text),
                    }
                })
                .collect()
        })
        .collect()
}

fn multiline_pair<'a>(expected: &'a Value, actual: &'a Value) -> Option<(&'a str, &'a str)> {
    let (e, a) = (expected.as_str()?, actual.as_str()?);
    (e.contains('\n') || a.contains('\n')).then_some((e, a))
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "$"
    } else {
        path
    }
}

/// Colored, indented rendering of one failure.
pub fn render_failure(failure: &FieldFailure) -> String {
    let mut out = String::new();
    let path = display_path(failure.path()).bold();
    match failure {
        FieldFailure::Mismatch {
            expected,
            actual,
            reason,
            ..
        } => {
            out.push_str(&format!("{} {path}", "~".yellow().bold()));
            if let Some(reason) = reason {
                out.push_str(&format!(": {}", reason.yellow()));
            }
            out.push('\n');
            match multiline_pair(expected, actual) {
                Some((e, a)) => {
                    for (i, hunk) in line_diff(e, a).iter().enumerate() {
                        if i > 0 {
                            out.push_str(&format!("    {}\n", "...".dimmed()));
                        }
                        for line in hunk {
                            let rendered = match line {
                                DiffLine::Context(t) => format!("  {t}").dimmed(),
                                DiffLine::Removed(t) => format!("- {t}").red(),
                                DiffLine::Added(t) => format!("+ {t}").green(),
                            };
                            out.push_str(&format!("    {rendered}\n"));
                        }
                    }
                }
                None => {
                    out.push_str(&format!("    expected: {}\n", describe(expected).green()));
                    out.push_str(&format!("    actual:   {}\n", describe(actual).red()));
                }
            }
        }
        FieldFailure::Missing { expected, .. } => {
            out.push_str(&format!("{} {path} {}\n", "-".red().bold(), "(only in expected)".dimmed()));
            out.push_str(&format!("    expected: {}\n", describe(expected).green()));
        }
        FieldFailure::Unexpected { actual, .. } => {
            out.push_str(&format!("{} {path} {}\n", "+".green().bold(), "(only in actual)".dimmed()));
            out.push_str(&format!("    actual:   {}\n", describe(actual).red()));
        }
    }
    out
}

/// The positional locations of a failure, one line per side that resolved.
pub fn render_resolved(resolved: &ResolvedPath) -> String {
    let mut out = String::new();
    if let Some(path) = &resolved.expected {
        out.push_str(&format!("    {} {}\n", "at expected".dimmed(), display_path(path).cyan()));
    }
    if let Some(path) = &resolved.actual {
        out.push_str(&format!("    {} {}\n", "at actual  ".dimmed(), display_path(path).cyan()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_diff_marks_changed_lines() {
        let hunks = line_diff("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0],
            vec![
                DiffLine::Context("a".into()),
                DiffLine::Removed("b".into()),
                DiffLine::Added("x".into()),
                DiffLine::Context("c".into()),
            ]
        );
    }

    #[test]
    fn identical_text_has_no_hunks() {
        assert!(line_diff("a\nb\n", "a\nb\n").is_empty());
    }

    #[test]
    fn multiline_strings_render_as_line_diff() {
        let failure = FieldFailure::Mismatch {
            path: "body".into(),
            expected: Value::from("one\ntwo"),
            actual: Value::from("one\nthree"),
            reason: None,
        };
        let out = render_failure(&failure);
        assert!(out.contains("body"));
        assert!(out.contains("- two"));
        assert!(out.contains("+ three"));
        assert!(!out.contains("expected:"));
    }

    #[test]
    fn scalar_mismatch_shows_both_sides() {
        let failure = FieldFailure::Mismatch {
            path: String::new(),
            expected: Value::from(1i64),
            actual: Value::from(2i64),
            reason: Some("outside tolerance".into()),
        };
        let out = render_failure(&failure);
        assert!(out.contains("$"));
        assert!(out.contains("outside tolerance"));
        assert!(out.contains("expected:"));
        assert!(out.contains("actual:"));
    }
}
