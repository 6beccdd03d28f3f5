//! Running a rule set over a pair of documents.

use jsondiff_core::{CompareResult, MatcherRegistry, ReportEntry};
use jsondiff_types::Value;
use serde::{Serialize, Serializer};

use crate::compile::CompiledRule;
use crate::config::RuleSet;
use crate::error::RuleResult;

/// Which document a selector failed to match in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Expected,
    Actual,
    Both,
}

impl Side {
    fn describe(&self) -> &'static str {
        match self {
            Side::Expected => "the expected document",
            Side::Actual => "the actual document",
            Side::Both => "either document",
        }
    }
}

/// What happened to one rule.
#[derive(Debug)]
pub enum RuleOutcome {
    /// The selected subtrees were compared.
    Compared {
        rule: usize,
        json_path: String,
        result: CompareResult,
    },
    /// The selector matched nothing on `side`; nothing was compared.
    Unmatched {
        rule: usize,
        json_path: String,
        side: Side,
    },
}

impl RuleOutcome {
    pub fn rule(&self) -> usize {
        match self {
            Self::Compared { rule, .. } | Self::Unmatched { rule, .. } => *rule,
        }
    }

    pub fn passed(&self) -> bool {
        match self {
            Self::Compared { result, .. } => result.passed(),
            Self::Unmatched { .. } => false,
        }
    }

    /// Report entries for this rule. An unmatched selector yields one entry
    /// keyed by the selector.
    pub fn entries(&self) -> Vec<ReportEntry> {
        match self {
            Self::Compared { result, .. } => result.to_report(),
            Self::Unmatched { json_path, side, .. } => vec![ReportEntry {
                expected: None,
                actual: None,
                diff_key: json_path.clone(),
                reason: format!("path {json_path} not found in {}", side.describe()),
            }],
        }
    }
}

/// Outcomes of every rule in file order.
#[derive(Debug, Default)]
pub struct RuleReport {
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(RuleOutcome::passed)
    }

    pub fn failed(&self) -> bool {
        !self.passed()
    }

    /// The flat report across all rules.
    pub fn entries(&self) -> Vec<ReportEntry> {
        self.outcomes.iter().flat_map(RuleOutcome::entries).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Serialize for RuleReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries().serialize(serializer)
    }
}

/// Compile `rules` against `registry` and run them.
pub fn run_rules(
    expected: &Value,
    actual: &Value,
    rules: &RuleSet,
    registry: &MatcherRegistry,
) -> RuleResult<RuleReport> {
    let compiled = rules.compile(registry)?;
    Ok(run_compiled(expected, actual, &compiled))
}

/// Run already compiled rules. Every rule runs, whatever the earlier ones
/// found.
pub fn run_compiled(expected: &Value, actual: &Value, rules: &[CompiledRule]) -> RuleReport {
    let outcomes: Vec<RuleOutcome> = rules
        .iter()
        .map(|rule| run_one(expected, actual, rule))
        .collect();

    let report = RuleReport { outcomes };
    tracing::debug!(
        rules = report.len(),
        passed = report.passed(),
        entries = report.entries().len(),
        "rule run finished"
    );
    report
}

fn run_one(expected: &Value, actual: &Value, rule: &CompiledRule) -> RuleOutcome {
    let expected = rule.prepare(expected);
    let actual = rule.prepare(actual);
    let json_path = rule.target().to_string();

    let (expected, actual) = match &rule.selector {
        None => (Some(expected), Some(actual)),
        Some(selector) => (selector.read(&expected), selector.read(&actual)),
    };

    match (expected, actual) {
        (Some(expected), Some(actual)) => RuleOutcome::Compared {
            rule: rule.index,
            result: rule.comparator.compare(&expected, &actual),
            json_path,
        },
        (expected, actual) => {
            let side = match (expected.is_none(), actual.is_none()) {
                (true, true) => Side::Both,
                (true, false) => Side::Expected,
                _ => Side::Actual,
            };
            tracing::warn!(rule = rule.index, path = %json_path, ?side, "selector matched nothing");
            RuleOutcome::Unmatched {
                rule: rule.index,
                json_path,
                side,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Value {
        text.parse().unwrap()
    }

    fn rules(yaml: &str) -> RuleSet {
        RuleSet::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn rules_compare_selected_subtrees_under_their_policies() {
        let expected = v(r#"{"head":{"id":1,"ts":100},"lines":[{"sku":"a"},{"sku":"b"}]}"#);
        let actual = v(r#"{"head":{"id":1,"ts":200,"extra":true},"lines":[{"sku":"b"},{"sku":"a"}]}"#);
        let set = rules(
            r#"
- jsonPath: $.head
  mode: LENIENT
  preProcess:
    - action: removeNode
      path: $.head.ts
- subRule:
    jsonPath: $.lines
    strictOrder: false
"#,
        );
        let report = run_rules(&expected, &actual, &set, MatcherRegistry::global()).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.passed(), "{:?}", report.entries());
    }

    #[test]
    fn failures_from_every_rule_are_collected() {
        let expected = v(r#"{"a":1,"b":{"c":2}}"#);
        let actual = v(r#"{"a":2,"b":{"c":3}}"#);
        let set = rules(
            r#"
- jsonPath: $.a
  fastFail: true
- jsonPath: $.b
"#,
        );
        let report = run_rules(&expected, &actual, &set, MatcherRegistry::global()).unwrap();
        let keys: Vec<String> = report.entries().into_iter().map(|e| e.diff_key).collect();
        assert_eq!(keys, vec!["".to_string(), "c".to_string()]);
    }

    #[test]
    fn unmatched_selector_is_a_failure_entry() {
        let expected = v(r#"{"a":1}"#);
        let actual = v(r#"{"b":1}"#);
        let set = rules("- jsonPath: $.a\n- jsonPath: $.z\n");
        let report = run_rules(&expected, &actual, &set, MatcherRegistry::global()).unwrap();

        assert!(report.failed());
        assert!(matches!(report.outcomes[0], RuleOutcome::Unmatched { side: Side::Actual, .. }));
        assert!(matches!(report.outcomes[1], RuleOutcome::Unmatched { side: Side::Both, .. }));
        let entries = report.entries();
        assert_eq!(entries[0].diff_key, "$.a");
        assert_eq!(entries[0].reason, "path $.a not found in the actual document");
    }

    #[test]
    fn custom_rules_apply_inside_the_selection() {
        let expected = v(r#"{"order":{"price":10.0,"ts":"x"}}"#);
        let actual = v(r#"{"order":{"price":10.004,"ts":"y"}}"#);
        let set = rules(
            r#"
- jsonPath: $.order
  mode: STRICT
  customRules:
    - name: TolerantValue
      jsonPath: price
      param: 0.01
    - name: IgnorePath
      jsonPath: ts
"#,
        );
        let report = run_rules(&expected, &actual, &set, MatcherRegistry::global()).unwrap();
        assert!(report.passed(), "{:?}", report.entries());
    }

    #[test]
    fn report_serializes_as_flat_list() {
        let set = rules("- mode: STRICT\n");
        let report = run_rules(&v(r#"{"a":1}"#), &v(r#"{"a":1,"b":2}"#), &set, MatcherRegistry::global()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["diffKey"], "b");
        assert_eq!(json[0]["reason"], "only in actual");
        assert!(json[0].get("expected").is_some());
    }
}
