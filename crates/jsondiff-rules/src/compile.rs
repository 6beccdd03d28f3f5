//! Turning rule configuration into ready-to-run comparators.

use jsondiff_core::{Customization, Customizations, DiffError, JsonComparator, MatcherRegistry};
use jsondiff_types::Value;

use crate::config::{PreProcessAction, RuleConfig, RuleSet};
use crate::error::{RuleError, RuleResult};
use crate::selector::Selector;

/// One rule with its selector parsed and its matchers resolved.
#[derive(Debug)]
pub struct CompiledRule {
    /// Position of the rule in its file, from 0.
    pub index: usize,
    /// Subtree to compare. Whole documents when `None`.
    pub selector: Option<Selector>,
    /// Nodes deleted from both documents first.
    pub removals: Vec<Selector>,
    pub comparator: JsonComparator,
}

impl CompiledRule {
    pub fn compile(index: usize, rule: &RuleConfig, registry: &MatcherRegistry) -> RuleResult<Self> {
        let selector = match rule.json_path.as_deref().map(str::trim) {
            Some("") => {
                return Err(RuleError::InvalidRule {
                    index,
                    reason: "jsonPath is empty".to_string(),
                })
            }
            Some(path) => Some(Selector::parse(path)?),
            None => None,
        };

        let mut removals = Vec::new();
        for step in &rule.pre_process {
            match step.action {
                PreProcessAction::RemoveNode if step.path.trim().is_empty() => {
                    tracing::warn!(rule = index, "removeNode without a path, skipped");
                }
                PreProcessAction::RemoveNode => removals.push(Selector::parse(&step.path)?),
            }
        }

        let policy = rule.policy();
        let mut customizations = Customizations::new();
        for custom in &rule.custom_rules {
            if custom.name.trim().is_empty() {
                return Err(RuleError::InvalidRule {
                    index,
                    reason: format!("custom rule for {:?} has no name", custom.json_path),
                });
            }
            let wrap = |source: DiffError| RuleError::Matcher {
                index,
                name: custom.name.clone(),
                source,
            };
            let matcher = registry
                .resolve(custom.name.trim(), &custom.param, &policy)
                .map_err(wrap)?;
            customizations.push(Customization::new(&custom.json_path, matcher).map_err(wrap)?);
        }

        tracing::debug!(
            rule = index,
            ?policy,
            customizations = customizations.len(),
            removals = removals.len(),
            "compiled rule"
        );

        Ok(Self {
            index,
            selector,
            removals,
            comparator: JsonComparator::with_customizations(policy, customizations),
        })
    }

    /// Apply the removals to a copy of `document`.
    pub fn prepare(&self, document: &Value) -> Value {
        let mut prepared = document.clone();
        for removal in &self.removals {
            let removed = removal.remove(&mut prepared);
            tracing::debug!(rule = self.index, selector = %removal, removed, "removeNode");
        }
        prepared
    }

    /// The selector text reported for this rule, `$` when it has none.
    pub fn target(&self) -> &str {
        self.selector.as_ref().map_or("$", Selector::as_str)
    }
}

impl RuleSet {
    /// Compile every rule, stopping at the first bad one.
    pub fn compile(&self, registry: &MatcherRegistry) -> RuleResult<Vec<CompiledRule>> {
        self.iter()
            .enumerate()
            .map(|(index, rule)| CompiledRule::compile(index, rule, registry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use jsondiff_types::{CompareContext, CompareMode};

    use super::*;
    use crate::config::{CustomRule, PreProcess};

    fn custom(name: &str, json_path: &str, param: &str) -> CustomRule {
        CustomRule {
            name: name.to_string(),
            json_path: json_path.to_string(),
            param: param.to_string(),
        }
    }

    #[test]
    fn compiles_policy_selector_and_customizations() {
        let rule = RuleConfig {
            json_path: Some("$.order".into()),
            mode: Some(CompareMode::Lenient),
            pre_process: vec![PreProcess {
                action: PreProcessAction::RemoveNode,
                path: "$.ts".into(),
            }],
            custom_rules: vec![custom("TolerantValue", "**.price", "0.01")],
            ..RuleConfig::default()
        };
        let compiled = CompiledRule::compile(0, &rule, MatcherRegistry::global()).unwrap();
        assert_eq!(compiled.target(), "$.order");
        assert_eq!(compiled.removals.len(), 1);
        assert_eq!(*compiled.comparator.policy(), CompareContext::from(CompareMode::Lenient));
        assert_eq!(compiled.comparator.customizations().len(), 1);
    }

    #[test]
    fn unknown_matcher_reports_rule_index() {
        let set = RuleSet::new(vec![
            RuleConfig::default().into(),
            RuleConfig {
                custom_rules: vec![custom("NoSuchMatcher", "a", "")],
                ..RuleConfig::default()
            }
            .into(),
        ]);
        let err = set.compile(MatcherRegistry::global()).unwrap_err();
        assert!(matches!(
            err,
            RuleError::Matcher { index: 1, source: DiffError::UnknownMatcher { .. }, .. }
        ));
    }

    #[test]
    fn bad_parameter_and_pattern_are_fatal() {
        let bad_param = RuleConfig {
            custom_rules: vec![custom("TolerantValue", "a", "lots")],
            ..RuleConfig::default()
        };
        assert!(matches!(
            CompiledRule::compile(0, &bad_param, MatcherRegistry::global()),
            Err(RuleError::Matcher { source: DiffError::MatcherInit { .. }, .. })
        ));

        let empty_path = RuleConfig {
            json_path: Some(" ".into()),
            ..RuleConfig::default()
        };
        assert!(matches!(
            CompiledRule::compile(3, &empty_path, MatcherRegistry::global()),
            Err(RuleError::InvalidRule { index: 3, .. })
        ));
    }

    #[test]
    fn empty_removal_path_is_skipped() {
        let rule = RuleConfig {
            pre_process: vec![PreProcess {
                action: PreProcessAction::RemoveNode,
                path: String::new(),
            }],
            ..RuleConfig::default()
        };
        let compiled = CompiledRule::compile(0, &rule, MatcherRegistry::global()).unwrap();
        assert!(compiled.removals.is_empty());
        assert_eq!(compiled.target(), "$");
    }

    #[test]
    fn prepare_leaves_the_input_untouched() {
        let rule = RuleConfig {
            pre_process: vec![PreProcess {
                action: PreProcessAction::RemoveNode,
                path: "$.ts".into(),
            }],
            ..RuleConfig::default()
        };
        let compiled = CompiledRule::compile(0, &rule, MatcherRegistry::global()).unwrap();
        let doc: Value = r#"{"ts":1,"a":2}"#.parse().unwrap();
        assert_eq!(compiled.prepare(&doc), r#"{"a":2}"#.parse::<Value>().unwrap());
        assert_eq!(doc.as_object().unwrap().len(), 2);
    }
}
