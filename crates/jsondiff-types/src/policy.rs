use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The comparison policy.
///
/// Four independent switches that govern a whole comparison. Matchers may
/// build a scoped copy with different flags for the subtree they handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareContext {
    /// The actual document may carry keys the expected one does not.
    pub extensible: bool,
    /// Arrays are compared index by index instead of by content.
    pub strict_order: bool,
    /// Mismatches whose expected side is `null` are not recorded.
    pub ignore_null: bool,
    /// Stop recording after the first failure.
    pub fast_fail: bool,
}

impl CompareContext {
    pub const fn new(extensible: bool, strict_order: bool, ignore_null: bool, fast_fail: bool) -> Self {
        Self {
            extensible,
            strict_order,
            ignore_null,
            fast_fail,
        }
    }

    /// Copy of this policy with a different `extensible` flag.
    pub const fn with_extensible(mut self, extensible: bool) -> Self {
        self.extensible = extensible;
        self
    }

    /// Copy of this policy with a different `strict_order` flag.
    pub const fn with_strict_order(mut self, strict_order: bool) -> Self {
        self.strict_order = strict_order;
        self
    }

    pub const fn with_ignore_null(mut self, ignore_null: bool) -> Self {
        self.ignore_null = ignore_null;
        self
    }

    pub const fn with_fast_fail(mut self, fast_fail: bool) -> Self {
        self.fast_fail = fast_fail;
        self
    }
}

impl Default for CompareContext {
    /// Extensible with strict array order, recording every failure.
    fn default() -> Self {
        CompareMode::StrictOrder.into()
    }
}

/// Named policy presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareMode {
    /// Not extensible, strict array order.
    Strict,
    /// Extensible, any array order.
    Lenient,
    /// Not extensible, any array order.
    NonExtensible,
    /// Extensible, strict array order.
    StrictOrder,
}

impl CompareMode {
    pub const ALL: [CompareMode; 4] = [
        Self::Strict,
        Self::Lenient,
        Self::NonExtensible,
        Self::StrictOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "STRICT",
            Self::Lenient => "LENIENT",
            Self::NonExtensible => "NON_EXTENSIBLE",
            Self::StrictOrder => "STRICT_ORDER",
        }
    }
}

impl From<CompareMode> for CompareContext {
    fn from(mode: CompareMode) -> Self {
        match mode {
            CompareMode::Strict => Self::new(false, true, false, false),
            CompareMode::Lenient => Self::new(true, false, false, false),
            CompareMode::NonExtensible => Self::new(false, false, false, false),
            CompareMode::StrictOrder => Self::new(true, true, false, false),
        }
    }
}

impl FromStr for CompareMode {
    type Err = TypeError;

    /// Accepts `STRICT`, `lenient`, `non-extensible`, `Strict_Order`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| TypeError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
