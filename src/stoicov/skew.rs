//! Trade-induced inventory skew.
//!
//! Both inventories are valued in asset0 terms at the mid price, the trade is
//! applied to those values, and the per-mode skew is compared before and
//! after. The result is the *change* in skew the trade causes, in PPB,
//! clamped to `[-1e9, 1e9]`:
//!
//! ```text
//! value0 = inventory0
//! value1 = inventory1 × 1e9 / mid
//!
//! NEUTRAL: skew(v0, v1) = 2·v0·1e9 / (v0 + v1) − 1e9     Δ = |after| − |before|
//! RISKY0:  skew(v0, v1) =   v0·1e9 / (v0 + v1)           Δ = after − before
//! RISKY1:  skew(v0, v1) =   v1·1e9 / (v0 + v1)           Δ = after − before
//! ```
//!
//! A positive delta means the trade leaves the pool in a less desirable
//! state, which the spread calculator turns into a wider half-spread.

use alloy::primitives::U256;
use tracing::{debug, trace};

use super::fixed::{checked_add, clamp_skew, mul_div, to_i64, PPB_U256};
use crate::consts::SKEW_BOUND;
use crate::{Error, Inventory, Result, RiskyMode, SwapDirection, TradeDescriptor};

/// Asset values after a simulated trade, both in asset0 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValuePair {
    value0: U256,
    value1: U256,
}

/// Change in normalized inventory skew caused by a prospective trade.
///
/// # Arguments
/// - `inventory0`, `inventory1`: pool holdings in native units
/// - `amount`: trade size in the input asset's units
/// - `zero_for_one`: `true` when the trader supplies asset0
/// - `risky_mode`: which exposure the pool minimizes
/// - `mid_price_ppb`: asset1 per asset0, PPB
///
/// # Errors
/// - [`Error::DivisionByZero`] when `mid_price_ppb` is zero
/// - [`Error::Overflow`] when an inventory is too large to value at this price
pub fn calculate_skew(
    inventory0: U256,
    inventory1: U256,
    amount: U256,
    zero_for_one: bool,
    risky_mode: RiskyMode,
    mid_price_ppb: U256,
) -> Result<i64> {
    if mid_price_ppb.is_zero() {
        return Err(Error::division_by_zero("mid price"));
    }
    // Empty pool: nothing to be skewed from
    if Inventory::new(inventory0, inventory1).is_empty() {
        return Ok(0);
    }

    let value0 = inventory0;
    let value1 = mul_div(inventory1, PPB_U256, mid_price_ppb, "inventory1 valuation")?;
    let before = ValuePair { value0, value1 };
    let after = apply_trade(
        before,
        amount,
        SwapDirection::from_zero_for_one(zero_for_one),
        mid_price_ppb,
    )?;

    let skew_before = skew_at_state(before.value0, before.value1, risky_mode)?;
    let skew_after = skew_at_state(after.value0, after.value1, risky_mode)?;

    let raw = match risky_mode {
        RiskyMode::Neutral => skew_after.abs() - skew_before.abs(),
        RiskyMode::Risky0 | RiskyMode::Risky1 => skew_after - skew_before,
    };
    let skew = clamp_skew(raw);
    if skew != raw {
        debug!(raw, clamped = skew, "Skew delta clamped");
    }

    trace!(
        mode = %risky_mode,
        %value0,
        %value1,
        value0_after = %after.value0,
        value1_after = %after.value1,
        skew_before,
        skew_after,
        skew,
        "Computed skew delta"
    );
    Ok(skew)
}

/// Normalized skew of a value pair (both in asset0 units) for the given mode.
///
/// Returns 0 when the pair sums to zero. NEUTRAL lies in `[-1e9, 1e9]`, the
/// risky modes in `[0, 1e9]`.
pub fn skew_at_state(value0: U256, value1: U256, risky_mode: RiskyMode) -> Result<i64> {
    let total = checked_add(value0, value1, "total value")?;
    if total.is_zero() {
        return Ok(0);
    }

    match risky_mode {
        RiskyMode::Neutral => {
            let doubled_share = mul_div(
                value0,
                PPB_U256 * U256::from(2u64),
                total,
                "neutral skew",
            )?;
            Ok(to_i64(doubled_share, "neutral skew")? - SKEW_BOUND)
        }
        RiskyMode::Risky0 => to_i64(mul_div(value0, PPB_U256, total, "risky0 skew")?, "risky0 skew"),
        RiskyMode::Risky1 => to_i64(mul_div(value1, PPB_U256, total, "risky1 skew")?, "risky1 skew"),
    }
}

/// Value both sides after the trade. The side the pool pays out of is floored
/// at zero when the trade nominally exceeds it.
fn apply_trade(
    state: ValuePair,
    amount: U256,
    direction: SwapDirection,
    mid_price_ppb: U256,
) -> Result<ValuePair> {
    match direction {
        SwapDirection::ZeroForOne => {
            let value0 = checked_add(state.value0, amount, "asset0 inflow")?;
            // asset1 paid out, then re-expressed in asset0 terms
            let paid1 = mul_div(amount, mid_price_ppb, PPB_U256, "asset1 outflow")?;
            let paid_value = mul_div(paid1, PPB_U256, mid_price_ppb, "asset1 outflow valuation")?;
            if paid_value > state.value1 {
                debug!(
                    requested = %paid_value,
                    available = %state.value1,
                    "Trade exceeds asset1 value, flooring at zero"
                );
            }
            Ok(ValuePair {
                value0,
                value1: state.value1.saturating_sub(paid_value),
            })
        }
        SwapDirection::OneForZero => {
            let received_value = mul_div(amount, PPB_U256, mid_price_ppb, "asset1 inflow valuation")?;
            let value1 = checked_add(state.value1, received_value, "asset1 inflow")?;
            if received_value > state.value0 {
                debug!(
                    requested = %received_value,
                    available = %state.value0,
                    "Trade exceeds asset0 value, flooring at zero"
                );
            }
            Ok(ValuePair {
                value0: state.value0.saturating_sub(received_value),
                value1,
            })
        }
    }
}

/// Stateless skew calculator bound to one risk mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkewCalculator {
    pub risky_mode: RiskyMode,
}

impl SkewCalculator {
    pub fn new(risky_mode: RiskyMode) -> Self {
        Self { risky_mode }
    }

    /// Skew delta of `trade` against `inventory`. See [`calculate_skew`].
    pub fn calculate(
        &self,
        inventory: &Inventory,
        trade: &TradeDescriptor,
        mid_price_ppb: U256,
    ) -> Result<i64> {
        calculate_skew(
            inventory.inventory0,
            inventory.inventory1,
            trade.amount,
            trade.direction.is_zero_for_one(),
            self.risky_mode,
            mid_price_ppb,
        )
    }

    /// Absolute skew of the pool as it stands, before any trade.
    pub fn current_skew(&self, inventory: &Inventory, mid_price_ppb: U256) -> Result<i64> {
        if mid_price_ppb.is_zero() {
            return Err(Error::division_by_zero("mid price"));
        }
        let value1 = mul_div(inventory.inventory1, PPB_U256, mid_price_ppb, "inventory1 valuation")?;
        skew_at_state(inventory.inventory0, value1, self.risky_mode)
    }
}
