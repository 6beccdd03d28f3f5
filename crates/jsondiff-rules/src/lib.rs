//! Rule files for jsondiff.
//!
//! A rule set splits one document comparison into several: each rule picks a
//! subtree with a selector, prunes nodes that should never be compared,
//! chooses its own policy and binds matchers to path patterns. The failures
//! of every rule are gathered into one flat report.
//!
//! # Quick Start
//!
//! ```rust
//! use jsondiff_core::MatcherRegistry;
//! use jsondiff_rules::{run_rules, RuleSet};
//! use jsondiff_types::Value;
//!
//! let rules = RuleSet::from_yaml_str(r#"
//! - jsonPath: $.order
//!   mode: LENIENT
//!   preProcess:
//!     - action: removeNode
//!       path: $.order.updatedAt
//!   customRules:
//!     - name: TolerantValue
//!       jsonPath: "**.price"
//!       param: 0.01
//! "#).unwrap();
//!
//! let expected: Value = r#"{"order": {"price": 5.0, "updatedAt": 1}}"#.parse().unwrap();
//! let actual: Value = r#"{"order": {"price": 5.004, "updatedAt": 2}}"#.parse().unwrap();
//!
//! let report = run_rules(&expected, &actual, &rules, MatcherRegistry::global()).unwrap();
//! assert!(report.passed());
//! ```
//!
//! # Key Types
//!
//! - [`RuleSet`] — Rules loaded from YAML, JSON or TOML
//! - [`Selector`] — JSONPath subset used for `jsonPath` and `removeNode`
//! - [`CompiledRule`] — A rule with its matchers resolved
//! - [`RuleReport`] — Per-rule outcomes and the flat report

pub mod compile;
pub mod config;
pub mod error;
pub mod runner;
pub mod selector;

pub use compile::CompiledRule;
pub use config::{CustomRule, PreProcess, PreProcessAction, RuleConfig, RuleEntry, RuleSet};
pub use error::{RuleError, RuleResult};
pub use runner::{run_compiled, run_rules, RuleOutcome, RuleReport, Side};
pub use selector::{Selector, Step};
