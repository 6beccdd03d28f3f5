//! Structural JSON comparison for jsondiff.
//!
//! Compares an expected document against an actual one under a
//! [`CompareContext`] policy and reports every disagreement as a
//! [`FieldFailure`] tagged with a path such as `orders[id=7].total`.
//! Individual paths can be handed to pluggable [`ValueMatcher`]s
//! (tolerances, ignores, order-insensitive arrays, embedded JSON, ...)
//! through [`Customization`]s.
//!
//! # Quick Start
//!
//! ```rust
//! use jsondiff_core::{compare, Customization, MatcherRegistry};
//! use jsondiff_types::{CompareMode, Value};
//!
//! let expected: Value = r#"{"id": 1, "price": 9.99, "tags": ["a", "b"]}"#.parse().unwrap();
//! let actual: Value = r#"{"id": 1, "price": 9.991, "tags": ["b", "a"]}"#.parse().unwrap();
//!
//! let policy = CompareMode::Lenient.into();
//! let tolerant = MatcherRegistry::global()
//!     .resolve("TolerantValue", "0.01", &policy)
//!     .unwrap();
//! let customizations = vec![Customization::new("price", tolerant).unwrap()];
//!
//! let result = compare(&expected, &actual, policy, customizations);
//! assert!(result.passed());
//! ```
//!
//! # Key Types
//!
//! - [`JsonComparator`] — The recursive comparison walk
//! - [`CompareResult`] — Ordered failure records plus the rendered message
//! - [`PathPattern`] — Wildcard path selector (`**.id`, `items[*].price`, `$`)
//! - [`MatcherRegistry`] — Name-based construction of built-in and custom matchers
//! - [`AbsolutePaths`] — Failure paths resolved to positional document locations

pub mod absolute;
pub mod arrays;
pub mod comparator;
pub mod customization;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod result;

pub use absolute::{absolute_path, resolve_absolute_paths, AbsolutePaths, ResolvedPath};
pub use arrays::ArrayStrategy;
pub use comparator::{JsonComparator, DEFAULT_MAX_DEPTH};
pub use customization::{Customization, Customizations};
pub use error::{DiffError, DiffResult};
pub use matcher::{MatchFailure, MatcherHandle, MatcherRegistry, ValueMatcher};
pub use pattern::PathPattern;
pub use result::{CompareResult, FailureKind, FieldFailure, ReportEntry};

use jsondiff_types::{CompareContext, Value};

/// Compare two documents in one call.
pub fn compare(
    expected: &Value,
    actual: &Value,
    policy: CompareContext,
    customizations: impl Into<Customizations>,
) -> CompareResult {
    JsonComparator::with_customizations(policy, customizations).compare(expected, actual)
}
