//! Matchers for approximate numeric equality.
//!
//! Each accepts numbers or numeric strings on either side. When either side
//! is not numeric, the values must be equal as documents.

use jsondiff_types::{CompareContext, Value};
use rust_decimal::{Decimal, RoundingStrategy};

use super::{decimal_of, decimal_param, float_of, param_pairs, MatchFailure, ValueMatcher};
use crate::comparator::JsonComparator;
use crate::error::{DiffError, DiffResult};
use crate::result::CompareResult;

/// `|a - e|`, or `None` if the difference overflows.
fn abs_diff(a: Decimal, e: Decimal) -> Option<Decimal> {
    a.checked_sub(e).map(|d| d.abs())
}

/// Parse a lone tolerance parameter, or keep `default` when empty.
fn tolerance_param(matcher: &str, param: &str, default: Decimal) -> DiffResult<Decimal> {
    match param_pairs(param, &[',', ';']).into_iter().next() {
        None => Ok(default),
        Some((_, raw)) => decimal_param(matcher, param, &raw),
    }
}

// ---------------------------------------------------------------------------
// TolerantValue
// ---------------------------------------------------------------------------

/// `|actual - expected| <= tolerance`. Default tolerance `1e-4`.
#[derive(Debug)]
pub struct TolerantValueMatcher {
    tolerance: Decimal,
}

impl Default for TolerantValueMatcher {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 4),
        }
    }
}

impl ValueMatcher for TolerantValueMatcher {
    fn name(&self) -> &str {
        "TolerantValue"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        self.tolerance = tolerance_param(self.name(), param, self.tolerance)?;
        Ok(())
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        match (decimal_of(actual), decimal_of(expected)) {
            (Some(a), Some(e)) => Ok(abs_diff(a, e).is_some_and(|d| d <= self.tolerance)),
            _ => Ok(actual == expected),
        }
    }
}

// ---------------------------------------------------------------------------
// PercentTolerant
// ---------------------------------------------------------------------------

/// `|actual - expected| / |expected| <= tolerance`. Default `1e-2`.
///
/// A zero expectation only matches zero.
#[derive(Debug)]
pub struct PercentTolerantMatcher {
    tolerance: Decimal,
}

impl Default for PercentTolerantMatcher {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }
}

impl ValueMatcher for PercentTolerantMatcher {
    fn name(&self) -> &str {
        "PercentTolerant"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        self.tolerance = tolerance_param(self.name(), param, self.tolerance)?;
        Ok(())
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        let (Some(a), Some(e)) = (decimal_of(actual), decimal_of(expected)) else {
            return Ok(actual == expected);
        };
        let Some(diff) = abs_diff(a, e) else {
            return Ok(false);
        };
        if e.is_zero() {
            return Ok(diff.is_zero());
        }
        Ok(diff
            .checked_div(e.abs())
            .is_some_and(|ratio| ratio <= self.tolerance))
    }
}

// ---------------------------------------------------------------------------
// NumberPrecise
// ---------------------------------------------------------------------------

/// Rounding modes accepted by [`NumberPreciseMatcher`], by ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    Up,
    Down,
    Ceiling,
    Floor,
    HalfUp,
    HalfDown,
    HalfEven,
    /// Values must already fit the scale.
    Unnecessary,
}

impl RoundingMode {
    const NAMES: [(&'static str, RoundingMode); 8] = [
        ("UP", Self::Up),
        ("DOWN", Self::Down),
        ("CEILING", Self::Ceiling),
        ("FLOOR", Self::Floor),
        ("HALF_UP", Self::HalfUp),
        ("HALF_DOWN", Self::HalfDown),
        ("HALF_EVEN", Self::HalfEven),
        ("UNNECESSARY", Self::Unnecessary),
    ];

    /// Accepts an ordinal `0..=7` or a name such as `HALF_EVEN`.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(ordinal) = raw.parse::<usize>() {
            return Self::NAMES.get(ordinal).map(|(_, mode)| *mode);
        }
        let upper = raw.to_ascii_uppercase();
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, mode)| *mode)
    }

    fn strategy(&self) -> Option<RoundingStrategy> {
        match self {
            Self::Up => Some(RoundingStrategy::AwayFromZero),
            Self::Down => Some(RoundingStrategy::ToZero),
            Self::Ceiling => Some(RoundingStrategy::ToPositiveInfinity),
            Self::Floor => Some(RoundingStrategy::ToNegativeInfinity),
            Self::HalfUp => Some(RoundingStrategy::MidpointAwayFromZero),
            Self::HalfDown => Some(RoundingStrategy::MidpointTowardZero),
            Self::HalfEven => Some(RoundingStrategy::MidpointNearestEven),
            Self::Unnecessary => None,
        }
    }
}

/// Equal after rounding both sides to `scale` decimal places.
///
/// Parameter: `scale=N,roundingMode=M` or positional `N,M`. Defaults to
/// six places, half-up.
#[derive(Debug)]
pub struct NumberPreciseMatcher {
    scale: u32,
    rounding: RoundingMode,
}

impl Default for NumberPreciseMatcher {
    fn default() -> Self {
        Self {
            scale: 6,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl NumberPreciseMatcher {
    fn round(&self, value: Decimal) -> Option<Decimal> {
        match self.rounding.strategy() {
            Some(strategy) => Some(value.round_dp_with_strategy(self.scale, strategy)),
            None => (value.round_dp(self.scale) == value).then_some(value),
        }
    }
}

impl ValueMatcher for NumberPreciseMatcher {
    fn name(&self) -> &str {
        "NumberPrecise"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        for (position, (key, raw)) in param_pairs(param, &[',', ';']).into_iter().enumerate() {
            let field = match key.as_deref() {
                Some("scale" | "newscale") => 0,
                Some("roundingmode" | "rounding" | "mode") => 1,
                Some(other) => {
                    return Err(DiffError::init(self.name(), param, format!("unknown key {other:?}")));
                }
                None => position,
            };
            match field {
                0 => {
                    self.scale = raw
                        .parse::<u32>()
                        .ok()
                        .filter(|s| *s <= 28)
                        .ok_or_else(|| DiffError::init(self.name(), param, "scale must be 0..=28"))?;
                }
                1 => {
                    self.rounding = RoundingMode::parse(&raw)
                        .ok_or_else(|| DiffError::init(self.name(), param, format!("unknown rounding mode {raw:?}")))?;
                }
                _ => return Err(DiffError::init(self.name(), param, "too many values")),
            }
        }
        Ok(())
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        let (Some(a), Some(e)) = (decimal_of(actual), decimal_of(expected)) else {
            return Ok(actual == expected);
        };
        match (self.round(a), self.round(e)) {
            (Some(a), Some(e)) => Ok(a == e),
            _ => Err(MatchFailure::new(
                format!("rounding to {} place(s) is necessary", self.scale),
                expected.clone(),
                actual.clone(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// DegreePrecise
// ---------------------------------------------------------------------------

/// Angles within `tolerance` degrees of each other, modulo 180.
///
/// Values outside `[-360, 360]` never match. Default tolerance `1e-4`.
#[derive(Debug)]
pub struct DegreePreciseMatcher {
    tolerance: f64,
}

impl Default for DegreePreciseMatcher {
    fn default() -> Self {
        Self { tolerance: 1e-4 }
    }
}

impl ValueMatcher for DegreePreciseMatcher {
    fn name(&self) -> &str {
        "DegreePrecise"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        if let Some((_, raw)) = param_pairs(param, &[',', ';']).into_iter().next() {
            self.tolerance = raw
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| DiffError::init(self.name(), param, format!("{raw:?} is not a tolerance")))?;
        }
        Ok(())
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        let (Some(a), Some(e)) = (float_of(actual), float_of(expected)) else {
            return Ok(actual == expected);
        };
        if a.abs() > 360.0 || e.abs() > 360.0 {
            return Ok(false);
        }
        let diff = (e.rem_euclid(180.0) - a.rem_euclid(180.0)).abs();
        Ok(diff.min(180.0 - diff) <= self.tolerance)
    }
}

// ---------------------------------------------------------------------------
// ImprecisePosition
// ---------------------------------------------------------------------------

/// Compares delimited coordinate strings such as `"1.0,2.0;3.0,4.0"`.
///
/// Parameter: `tolerance=T;separator=S`. Each character of `S` is one
/// nesting level, outermost first. Defaults to `1e-2` and `,`.
#[derive(Debug)]
pub struct ImprecisePositionMatcher {
    tolerance: Decimal,
    separators: Vec<char>,
}

impl Default for ImprecisePositionMatcher {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
            separators: vec![','],
        }
    }
}

impl ImprecisePositionMatcher {
    fn positions_match(&self, actual: &str, expected: &str, level: usize) -> bool {
        let Some(&separator) = self.separators.get(level) else {
            return self.coordinates_match(actual, expected);
        };
        let actual_parts: Vec<&str> = actual.split(separator).collect();
        let expected_parts: Vec<&str> = expected.split(separator).collect();
        actual_parts.len() == expected_parts.len()
            && actual_parts
                .iter()
                .zip(&expected_parts)
                .all(|(a, e)| self.positions_match(a, e, level + 1))
    }

    fn coordinates_match(&self, actual: &str, expected: &str) -> bool {
        let as_number = |text: &str| decimal_of(&Value::String(text.to_string()));
        match (as_number(actual), as_number(expected)) {
            (Some(a), Some(e)) => abs_diff(a, e).is_some_and(|d| d <= self.tolerance),
            _ => actual == expected,
        }
    }
}

impl ValueMatcher for ImprecisePositionMatcher {
    fn name(&self) -> &str {
        "ImprecisePosition"
    }

    fn init(&mut self, param: &str, _policy: &CompareContext) -> DiffResult<()> {
        const SEPARATOR_KEY: &str = "separator=";

        // The separator list may itself contain `;`, so it always runs to
        // the end of the parameter.
        let compact: String = param.chars().filter(|c| !c.is_whitespace()).collect();
        let (head, separators) = match compact.find(SEPARATOR_KEY) {
            Some(at) => (&compact[..at], Some(&compact[at + SEPARATOR_KEY.len()..])),
            None => (compact.as_str(), None),
        };

        for (position, (key, raw)) in param_pairs(head.trim_end_matches(';'), &[';'])
            .into_iter()
            .enumerate()
        {
            match (key.as_deref(), position) {
                (Some("tolerance"), _) | (None, 0) => {
                    self.tolerance = decimal_param(self.name(), param, &raw)?;
                }
                (None, 1) if separators.is_none() => self.separators = raw.chars().collect(),
                _ => return Err(DiffError::init(self.name(), param, "expected tolerance=T;separator=S")),
            }
        }
        if let Some(separators) = separators {
            self.separators = separators.chars().collect();
        }
        Ok(())
    }

    fn equal(
        &self,
        _path: &str,
        actual: &Value,
        expected: &Value,
        _result: &mut CompareResult,
        _comparator: &JsonComparator,
    ) -> Result<bool, MatchFailure> {
        Ok(self.positions_match(&actual.to_plain_string(), &expected.to_plain_string(), 0))
    }
}
