//! Pool-side inputs: inventory snapshot and risk mode.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Which exposure the liquidity provider is trying to minimize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskyMode {
    /// Target equal value in both assets.
    #[default]
    Neutral,
    /// Asset0 is the volatile asset; hold as little of it as possible.
    Risky0,
    /// Asset1 is the volatile asset; hold as little of it as possible.
    Risky1,
}

impl RiskyMode {
    /// All modes, in declaration order.
    pub const ALL: [RiskyMode; 3] = [RiskyMode::Neutral, RiskyMode::Risky0, RiskyMode::Risky1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Risky0 => "risky0",
            Self::Risky1 => "risky1",
        }
    }

    /// Asset index (0 or 1) treated as risky, if any.
    pub fn risky_asset(&self) -> Option<u8> {
        match self {
            Self::Neutral => None,
            Self::Risky0 => Some(0),
            Self::Risky1 => Some(1),
        }
    }
}

impl fmt::Display for RiskyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "neutral" | "value_neutral" => Ok(Self::Neutral),
            "risky0" | "risky_0" => Ok(Self::Risky0),
            "risky1" | "risky_1" => Ok(Self::Risky1),
            other => Err(Error::InvalidConfig(format!(
                "unknown risky mode '{other}'. Use: neutral, risky0, risky1"
            ))),
        }
    }
}

/// Snapshot of the pool's holdings in each asset's native smallest unit.
///
/// Owned by the pool ledger; the calculators only read it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub inventory0: U256,
    pub inventory1: U256,
}

impl Inventory {
    pub fn new(inventory0: U256, inventory1: U256) -> Self {
        Self {
            inventory0,
            inventory1,
        }
    }

    /// True when the pool holds nothing on either side.
    pub fn is_empty(&self) -> bool {
        self.inventory0.is_zero() && self.inventory1.is_zero()
    }
}
