//! Foundation types for jsondiff.
//!
//! This crate provides the document value model and the comparison policy
//! shared by every other jsondiff crate.
//!
//! # Key Types
//!
//! - [`Value`] — Immutable JSON-like tree (null, bool, number, string, array, object)
//! - [`Number`] — Numeric literal that compares by value (`1 == 1.0 == 1e0`)
//! - [`Object`] — Insertion-ordered key/value mapping with O(1) lookup
//! - [`CompareContext`] — The four-flag comparison policy
//! - [`CompareMode`] — Named policy presets (`STRICT`, `LENIENT`, ...)

pub mod error;
pub mod number;
pub mod policy;
pub mod value;

pub use error::TypeError;
pub use number::Number;
pub use policy::{CompareContext, CompareMode};
pub use value::{Object, Value, ValueKind};
