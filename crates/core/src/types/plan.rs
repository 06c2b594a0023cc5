//! Credit plans.
//!
//! A plan is a named bundle with a fixed credit grant and a fixed price. The
//! table is closed: adding a plan means adding a variant here, and every
//! `match` on [`Plan`] must handle it.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a plan identifier does not name a known plan.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown plan: {0}")]
pub struct PlanError(pub String);

/// A purchasable credit plan.
///
/// Identifiers are matched exactly (`"Basic"`, `"Advanced"`, `"Business"`),
/// which is also how they are stored and serialized.
///
/// ```
/// use imagify_core::Plan;
///
/// let plan: Plan = "Advanced".parse().unwrap();
/// assert_eq!(plan.credits(), 500);
/// assert_eq!(plan.amount(), 50);
/// assert!("advanced".parse::<Plan>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    Basic,
    Advanced,
    Business,
}

impl Plan {
    /// All plans, cheapest first.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Advanced, Self::Business];

    /// Plan identifier as used by clients and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Advanced => "Advanced",
            Self::Business => "Business",
        }
    }

    /// Credits granted when this plan is paid for.
    #[must_use]
    pub const fn credits(self) -> i64 {
        match self {
            Self::Basic => 100,
            Self::Advanced => 500,
            Self::Business => 5000,
        }
    }

    /// Price in whole currency units.
    #[must_use]
    pub const fn amount(self) -> i64 {
        match self {
            Self::Basic => 10,
            Self::Advanced => 50,
            Self::Business => 250,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Self::Basic),
            "Advanced" => Ok(Self::Advanced),
            "Business" => Ok(Self::Business),
            other => Err(PlanError(other.to_owned())),
        }
    }
}
