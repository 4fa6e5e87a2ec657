//! Trade-side inputs.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Which asset the trader gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// Trader supplies asset0 and receives asset1.
    ZeroForOne,
    /// Trader supplies asset1 and receives asset0.
    OneForZero,
}

impl SwapDirection {
    pub fn from_zero_for_one(zero_for_one: bool) -> Self {
        if zero_for_one {
            Self::ZeroForOne
        } else {
            Self::OneForZero
        }
    }

    pub fn is_zero_for_one(&self) -> bool {
        matches!(self, Self::ZeroForOne)
    }
}

/// A prospective trade. `amount` is in the input asset's native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeDescriptor {
    pub amount: U256,
    pub direction: SwapDirection,
}

impl TradeDescriptor {
    pub fn new(amount: U256, direction: SwapDirection) -> Self {
        Self { amount, direction }
    }

    pub fn zero_for_one(amount: U256) -> Self {
        Self::new(amount, SwapDirection::ZeroForOne)
    }

    pub fn one_for_zero(amount: U256) -> Self {
        Self::new(amount, SwapDirection::OneForZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_flag() {
        assert_eq!(SwapDirection::from_zero_for_one(true), SwapDirection::ZeroForOne);
        assert_eq!(SwapDirection::from_zero_for_one(false), SwapDirection::OneForZero);
        assert!(SwapDirection::ZeroForOne.is_zero_for_one());
        assert!(!SwapDirection::OneForZero.is_zero_for_one());
    }
}
