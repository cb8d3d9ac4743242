//! Non-fatal diagnostics collected during translation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the translator accepted but the caller may want to know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Warning {
    /// A gate outside the fixed vocabulary, drawn as a labelled box.
    UnknownGate { name: String },
    /// `if (c)` on a multi-bit register; only the first bit is used.
    MultiBitCondition { register: String, size: u32 },
    /// A comparison such as `c[0] == 1` rewritten to a plain bit test.
    ConditionNormalized { condition: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownGate { name } => {
                write!(f, "unknown gate '{name}' drawn as a generic box")
            }
            Warning::MultiBitCondition { register, size } => write!(
                f,
                "condition on {size}-bit register '{register}' uses only {register}[0]"
            ),
            Warning::ConditionNormalized { condition } => {
                write!(f, "condition '{condition}' treated as a single-bit test")
            }
        }
    }
}
