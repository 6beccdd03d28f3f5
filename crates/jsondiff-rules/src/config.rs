//! The rule file model.
//!
//! A rule file is a list of rules. Each entry is either a rule mapping or a
//! mapping with a single `subRule` key holding one:
//!
//! ```yaml
//! - jsonPath: $.order
//!   mode: LENIENT
//!   preProcess:
//!     - action: removeNode
//!       path: $.updatedAt
//!   customRules:
//!     - name: TolerantValue
//!       jsonPath: "**.price"
//!       param: 0.01
//! - subRule:
//!     jsonPath: $.lines
//!     strictOrder: false
//! ```
//!
//! JSON files use the same shape. TOML files wrap the list in a top-level
//! `[[rules]]` array, which YAML and JSON files may use too.

use std::fs;
use std::path::Path;

use jsondiff_types::{CompareContext, CompareMode};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RuleError, RuleResult};

// ---------------------------------------------------------------------------
// RuleConfig
// ---------------------------------------------------------------------------

/// One comparison rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleConfig {
    /// Selects the subtree both documents are compared at. Whole documents
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
    /// Policy preset the flags below override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<CompareMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_order: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_null: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_fail: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_process: Vec<PreProcess>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_rules: Vec<CustomRule>,
}

impl RuleConfig {
    /// The effective policy: the preset (or the default policy) with any
    /// explicit flags applied on top.
    pub fn policy(&self) -> CompareContext {
        let base = self.mode.map(CompareContext::from).unwrap_or_default();
        CompareContext {
            extensible: self.extensible.unwrap_or(base.extensible),
            strict_order: self.strict_order.unwrap_or(base.strict_order),
            ignore_null: self.ignore_null.unwrap_or(base.ignore_null),
            fast_fail: self.fast_fail.unwrap_or(base.fast_fail),
        }
    }
}

/// A document transformation applied before comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreProcess {
    pub action: PreProcessAction,
    /// Selector of the nodes to act on.
    #[serde(default)]
    pub path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreProcessAction {
    /// Delete every node the path selects from both documents.
    RemoveNode,
}

/// Binds a named matcher to a path pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomRule {
    /// Registered matcher name, e.g. `TolerantValue`.
    pub name: String,
    /// Path pattern, e.g. `**.price`.
    pub json_path: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub param: String,
}

/// Accept `0.01`, `true` or `"0.01"` for string-typed parameters.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => String::new(),
        Some(Scalar::Text(s)) => s,
        Some(Scalar::Int(i)) => i.to_string(),
        Some(Scalar::Float(f)) => f.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
    })
}

// ---------------------------------------------------------------------------
// RuleEntry
// ---------------------------------------------------------------------------

/// A list item: a rule, or a rule wrapped in `subRule`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Sub {
        #[serde(rename = "subRule")]
        sub_rule: RuleConfig,
    },
    Direct(RuleConfig),
}

impl RuleEntry {
    pub fn rule(&self) -> &RuleConfig {
        match self {
            Self::Sub { sub_rule } => sub_rule,
            Self::Direct(rule) => rule,
        }
    }
}

impl From<RuleConfig> for RuleEntry {
    fn from(rule: RuleConfig) -> Self {
        Self::Direct(rule)
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleDocument {
    List(Vec<RuleEntry>),
    Table { rules: Vec<RuleEntry> },
}

/// An ordered list of rules, run one after another.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RuleSet {
    pub rules: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn new(rules: Vec<RuleEntry>) -> Self {
        Self { rules }
    }

    /// A single rule comparing whole documents under `policy`.
    pub fn single(policy: CompareContext) -> Self {
        Self::new(vec![RuleEntry::Direct(RuleConfig {
            extensible: Some(policy.extensible),
            strict_order: Some(policy.strict_order),
            ignore_null: Some(policy.ignore_null),
            fast_fail: Some(policy.fast_fail),
            ..RuleConfig::default()
        })])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rules with `subRule` wrappers removed.
    pub fn iter(&self) -> impl Iterator<Item = &RuleConfig> {
        self.rules.iter().map(RuleEntry::rule)
    }

    pub fn from_yaml_str(text: &str) -> RuleResult<Self> {
        let doc: RuleDocument = serde_yaml::from_str(text).map_err(|e| RuleError::Parse {
            format: "yaml",
            reason: e.to_string(),
        })?;
        Ok(doc.into_rule_set())
    }

    pub fn from_json_str(text: &str) -> RuleResult<Self> {
        let doc: RuleDocument = serde_json::from_str(text).map_err(|e| RuleError::Parse {
            format: "json",
            reason: e.to_string(),
        })?;
        Ok(doc.into_rule_set())
    }

    /// TOML files must use a top-level `[[rules]]` array.
    pub fn from_toml_str(text: &str) -> RuleResult<Self> {
        #[derive(Deserialize)]
        struct TomlRules {
            rules: Vec<RuleEntry>,
        }

        let doc: TomlRules = toml::from_str(text).map_err(|e| RuleError::Parse {
            format: "toml",
            reason: e.to_string(),
        })?;
        Ok(Self::new(doc.rules))
    }

    /// Load a rule file, choosing the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> RuleResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> RuleResult<Self> = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => {
                return Err(RuleError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        let text = fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = parse(&text)?;
        tracing::debug!(path = %path.display(), rules = rules.len(), "loaded rule file");
        Ok(rules)
    }
}

impl RuleDocument {
    fn into_rule_set(self) -> RuleSet {
        match self {
            Self::List(rules) | Self::Table { rules } => RuleSet::new(rules),
        }
    }
}
