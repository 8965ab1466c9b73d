use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stage of microcode transformation the host can generate a function at.
///
/// `Zero` is not a real level; it stands for "nothing selected" and is what a
/// cancelled maturity prompt yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Maturity {
    #[serde(rename = "MMAT_ZERO")]
    Zero,
    #[serde(rename = "MMAT_GENERATED")]
    Generated,
    #[serde(rename = "MMAT_PREOPTIMIZED")]
    Preoptimized,
    #[serde(rename = "MMAT_LOCOPT")]
    LocalOpt,
    #[serde(rename = "MMAT_CALLS")]
    Calls,
    #[serde(rename = "MMAT_GLBOPT1")]
    GlobalOpt1,
    #[serde(rename = "MMAT_GLBOPT2")]
    GlobalOpt2,
    #[serde(rename = "MMAT_GLBOPT3")]
    GlobalOpt3,
    #[serde(rename = "MMAT_LVARS")]
    LocalVars,
}

const ALL: [Maturity; 9] = [
    Maturity::Zero,
    Maturity::Generated,
    Maturity::Preoptimized,
    Maturity::LocalOpt,
    Maturity::Calls,
    Maturity::GlobalOpt1,
    Maturity::GlobalOpt2,
    Maturity::GlobalOpt3,
    Maturity::LocalVars,
];

impl Maturity {
    /// Levels a user may pick from, in generation order.
    pub fn selectable() -> &'static [Maturity] {
        &ALL[1..]
    }

    /// Map a zero-based selection index in [`Maturity::selectable`] to a level.
    ///
    /// Out-of-range selections (including a cancelled prompt) yield `Zero`.
    pub fn from_selection(index: Option<usize>) -> Maturity {
        index.and_then(|i| Self::selectable().get(i).copied()).unwrap_or(Maturity::Zero)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Maturity::Zero => "MMAT_ZERO",
            Maturity::Generated => "MMAT_GENERATED",
            Maturity::Preoptimized => "MMAT_PREOPTIMIZED",
            Maturity::LocalOpt => "MMAT_LOCOPT",
            Maturity::Calls => "MMAT_CALLS",
            Maturity::GlobalOpt1 => "MMAT_GLBOPT1",
            Maturity::GlobalOpt2 => "MMAT_GLBOPT2",
            Maturity::GlobalOpt3 => "MMAT_GLBOPT3",
            Maturity::LocalVars => "MMAT_LVARS",
        }
    }

    pub fn is_zero(self) -> bool {
        self == Maturity::Zero
    }
}

impl Default for Maturity {
    fn default() -> Self {
        Maturity::Generated
    }
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a maturity name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown maturity level '{0}'")]
pub struct UnknownMaturity(pub String);

impl FromStr for Maturity {
    type Err = UnknownMaturity;

    /// Accepts the host names (`MMAT_LOCOPT`) as well as the bare suffix in any
    /// case (`locopt`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        let wanted = wanted.strip_prefix("MMAT_").unwrap_or(&wanted);
        ALL.iter()
            .copied()
            .find(|m| m.as_str().strip_prefix("MMAT_") == Some(wanted))
            .ok_or_else(|| UnknownMaturity(s.to_string()))
    }
}
