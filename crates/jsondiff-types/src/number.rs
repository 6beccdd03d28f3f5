//! Numeric literals that compare by value.
//!
//! A [`Number`] keeps the text it was built from next to a canonical key
//! used for equality and hashing. Numbers read through `serde_json` carry its
//! rendering of the value rather than the document's spelling. The
//! key is an exact, normalized decimal whenever the literal fits in a
//! [`Decimal`], and the IEEE-754 value otherwise.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::TypeError;

/// A JSON number.
///
/// `1`, `1.0`, `1.00` and `1e0` are all equal and hash identically.
#[derive(Clone)]
pub struct Number {
    literal: String,
    key: NumericKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum NumericKey {
    Exact(Decimal),
    Approx(u64),
}

impl Number {
    /// Build a number from a finite float. Returns `None` for NaN/infinity.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let literal = if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{value:.1}")
        } else {
            value.to_string()
        };
        Self::parse(&literal).ok()
    }

    /// The literal text this number was built from.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// The value as a float (may lose precision).
    pub fn as_f64(&self) -> f64 {
        match self.key {
            NumericKey::Exact(d) => d.to_f64().unwrap_or(f64::NAN),
            NumericKey::Approx(bits) => f64::from_bits(bits),
        }
    }

    /// The exact decimal value, if the literal fits in a [`Decimal`].
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self.key {
            NumericKey::Exact(d) => Some(d),
            NumericKey::Approx(_) => None,
        }
    }

    /// Returns `true` if the value has no fractional part.
    pub fn is_integer(&self) -> bool {
        match self.key {
            NumericKey::Exact(d) => d.fract().is_zero(),
            NumericKey::Approx(bits) => f64::from_bits(bits).fract() == 0.0,
        }
    }

    fn parse(literal: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidNumber(literal.to_string());

        let first = literal.chars().next().ok_or_else(invalid)?;
        if first != '-' && !first.is_ascii_digit() {
            return Err(invalid());
        }

        if let Some(d) = parse_decimal(literal) {
            return Ok(Self {
                literal: literal.to_string(),
                key: NumericKey::Exact(d.normalize()),
            });
        }

        let float: f64 = literal.parse().map_err(|_| invalid())?;
        if !float.is_finite() {
            return Err(invalid());
        }
        // -0.0 and 0.0 share a key.
        let float = if float == 0.0 { 0.0 } else { float };
        Ok(Self {
            literal: literal.to_string(),
            key: NumericKey::Approx(float.to_bits()),
        })
    }
}

/// Parse a JSON numeric literal as an exact decimal.
///
/// Returns `None` when the literal has more precision or range than a
/// [`Decimal`] can hold.
pub fn parse_decimal(literal: &str) -> Option<Decimal> {
    if literal.contains(['e', 'E']) {
        Decimal::from_scientific(&literal.to_ascii_lowercase()).ok()
    } else {
        Decimal::from_str_exact(literal).ok()
    }
}

impl FromStr for Number {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({})", self.literal)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self {
            literal: value.to_string(),
            key: NumericKey::Exact(Decimal::from(value)),
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self {
            literal: value.to_string(),
            key: NumericKey::Exact(Decimal::from(value)),
        }
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Self::from(value as u64)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}
