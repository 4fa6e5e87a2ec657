//! Avellaneda-Stoikov reservation price.
//!
//! The quote centre moves away from mid in proportion to the inventory the
//! pool wants to shed:
//!
//! ```text
//! shift = −q · γσ² · τ          (fraction of mid, bps×1e5)
//! r     = mid × (1 + shift)
//! bid   = r − δ·mid
//! ask   = r + δ·mid
//! ```
//!
//! `q` is measured in whole asset0 units (PPB), `γσ²` is the bucket's
//! `gamma_stdev2` (bps, PPB) and `τ` is the horizon (PPB). Long asset0 moves
//! the centre down so the pool sells asset0 more readily.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{I256, U256};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::bucket::SpreadBucket;
use super::fixed::{checked_add, mul_div, pow10, serialize_as_string, to_signed, PPB_U256};
use crate::{Error, Inventory, Result, RiskyMode};

/// `q·γσ²·τ` carries three PPB factors; dividing by 1e22 leaves bps×1e5.
const SHIFT_DECIMALS: u32 = 22;

/// How the inventory quantity `q` is read from the pool balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryMode {
    /// `q = 0`: quotes stay centred on mid.
    NoInventory,
    /// `q = inventory0`: any asset0 held is excess.
    Risky0Zero,
    /// `q = inventory1 / mid`: any asset1 held is excess.
    Risky1Zero,
    /// `q = inventory0 − inventory1 / mid`: excess over a value-balanced pool.
    #[default]
    ValueNeutral,
}

impl InventoryMode {
    pub const ALL: [InventoryMode; 4] = [
        InventoryMode::NoInventory,
        InventoryMode::Risky0Zero,
        InventoryMode::Risky1Zero,
        InventoryMode::ValueNeutral,
    ];

    /// Inventory reading that matches a skew risk mode.
    pub fn for_risky_mode(mode: RiskyMode) -> Self {
        match mode.risky_asset() {
            None => Self::ValueNeutral,
            Some(0) => Self::Risky0Zero,
            Some(_) => Self::Risky1Zero,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoInventory => "no_inventory",
            Self::Risky0Zero => "risky0_zero",
            Self::Risky1Zero => "risky1_zero",
            Self::ValueNeutral => "value_neutral",
        }
    }
}

impl fmt::Display for InventoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "no_inventory" | "none" => Ok(Self::NoInventory),
            "risky0_zero" => Ok(Self::Risky0Zero),
            "risky1_zero" => Ok(Self::Risky1Zero),
            "value_neutral" | "neutral" => Ok(Self::ValueNeutral),
            other => Err(Error::InvalidConfig(format!(
                "unknown inventory mode '{other}'. Use: no_inventory, risky0_zero, risky1_zero, value_neutral"
            ))),
        }
    }
}

/// Reservation settings attached to a quoter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationParams {
    pub inventory_mode: InventoryMode,
    /// Native units per whole asset0 (1e18 for an 18-decimal token)
    pub asset0_unit: U256,
    /// Horizon τ, PPB
    pub tau: U256,
}

impl ReservationParams {
    pub fn new(inventory_mode: InventoryMode, asset0_decimals: u32, tau: U256) -> Result<Self> {
        if asset0_decimals > 38 {
            return Err(Error::InvalidConfig(format!(
                "asset0 decimals {asset0_decimals} out of range (0..=38)"
            )));
        }
        Ok(Self {
            inventory_mode,
            asset0_unit: pow10(asset0_decimals),
            tau,
        })
    }
}

/// Inventory quantity `q` in whole asset0 units, PPB, signed.
///
/// Asset1 holdings are converted to asset0 at `mid_price_ppb` first.
///
/// # Errors
/// - [`Error::DivisionByZero`] when `mid_price_ppb` or `asset0_unit` is zero
/// - [`Error::Overflow`] when a balance is too large to convert
pub fn inventory_quantity(
    mode: InventoryMode,
    inventory: &Inventory,
    mid_price_ppb: U256,
    asset0_unit: U256,
) -> Result<I256> {
    if mid_price_ppb.is_zero() {
        return Err(Error::division_by_zero("mid price"));
    }
    if asset0_unit.is_zero() {
        return Err(Error::division_by_zero("asset0 unit"));
    }
    let whole0 = |raw: U256| mul_div(raw, PPB_U256, asset0_unit, "inventory quantity");
    let held0 = || -> Result<I256> { to_signed(whole0(inventory.inventory0)?, "inventory quantity") };
    let held1 = || -> Result<I256> {
        let as_asset0 = mul_div(inventory.inventory1, PPB_U256, mid_price_ppb, "inventory quantity")?;
        to_signed(whole0(as_asset0)?, "inventory quantity")
    };

    let q = match mode {
        InventoryMode::NoInventory => I256::ZERO,
        InventoryMode::Risky0Zero => held0()?,
        InventoryMode::Risky1Zero => held1()?,
        InventoryMode::ValueNeutral => held0()?
            .checked_sub(held1()?)
            .ok_or_else(|| Error::overflow("inventory quantity"))?,
    };
    trace!(mode = %mode, %q, "Inventory quantity");
    Ok(q)
}

/// Reservation shift `−q·γσ²·τ` as a fraction of mid, bps×1e5.
///
/// Truncates toward zero.
pub fn reservation_shift(q: I256, gamma_stdev2: U256, tau: U256) -> Result<I256> {
    let overflow = || Error::overflow("reservation shift");
    let product = q
        .checked_mul(to_signed(gamma_stdev2, "reservation shift")?)
        .and_then(|v| v.checked_mul(I256::try_from(tau).ok()?))
        .ok_or_else(overflow)?;
    let shift = product
        .checked_div(to_signed(pow10(SHIFT_DECIMALS), "reservation shift")?)
        .ok_or_else(overflow)?;
    I256::ZERO.checked_sub(shift).ok_or_else(overflow)
}

/// `mid × (1 + shift)`, floored at zero.
pub fn reservation_price(mid_price_ppb: U256, shift: I256) -> Result<U256> {
    let factor = to_signed(PPB_U256, "reservation price")?
        .checked_add(shift)
        .ok_or_else(|| Error::overflow("reservation price"))?;
    if factor.is_negative() || factor.is_zero() {
        return Ok(U256::ZERO);
    }
    mul_div(mid_price_ppb, factor.into_raw(), PPB_U256, "reservation price")
}

/// Bid and ask `r ∓ half_spread·mid`. The bid floors at zero.
pub fn bid_ask_around(
    reservation_price_ppb: U256,
    mid_price_ppb: U256,
    half_spread: U256,
) -> Result<(U256, U256)> {
    let offset = mul_div(mid_price_ppb, half_spread, PPB_U256, "half-spread offset")?;
    let bid = reservation_price_ppb.saturating_sub(offset);
    let ask = checked_add(reservation_price_ppb, offset, "ask price")?;
    Ok((bid, ask))
}

/// `q` that produces a shift of `severity·σ` for this bucket:
/// `q = severity / (γσ·τ)` with `γσ = scale·σ/δ`. Zero when `γσ·τ` is zero.
pub fn severity_quantity(severity: U256, bucket: &SpreadBucket, tau: U256) -> Result<I256> {
    let gamma_sigma = mul_div(bucket.gamma_scale, bucket.stdev, bucket.level, "severity quantity")?;
    let denominator = gamma_sigma
        .checked_mul(tau)
        .ok_or_else(|| Error::overflow("severity quantity"))?;
    if denominator.is_zero() {
        return Ok(I256::ZERO);
    }
    let numerator = severity
        .checked_mul(PPB_U256)
        .and_then(|v| v.checked_mul(PPB_U256))
        .ok_or_else(|| Error::overflow("severity quantity"))?;
    to_signed(numerator / denominator, "severity quantity")
}

/// One row of the severity scenario grid. Offsets are relative to mid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioRow {
    /// δ, bps×1e5
    #[serde(serialize_with = "serialize_as_string")]
    pub level: U256,
    /// σ, bps×1e5
    #[serde(serialize_with = "serialize_as_string")]
    pub stdev: U256,
    /// PPB
    #[serde(serialize_with = "serialize_as_string")]
    pub gamma_scale: U256,
    /// PPB
    #[serde(serialize_with = "serialize_as_string")]
    pub severity: U256,
    /// Optimal half-spread δ*, bps×1e5
    #[serde(serialize_with = "serialize_as_string")]
    pub half_spread: U256,
    #[serde(serialize_with = "serialize_as_string")]
    pub shift: I256,
    #[serde(serialize_with = "serialize_as_string")]
    pub bid_offset: I256,
    #[serde(serialize_with = "serialize_as_string")]
    pub ask_offset: I256,
    #[serde(serialize_with = "serialize_as_string")]
    pub spread: U256,
}

/// Every (σ multiplier, gamma scale, severity) combination for one level,
/// in that nesting order. Multipliers, scales, severities and `tau` are PPB.
pub fn scenario_table(
    level: U256,
    sigma_multipliers: &[U256],
    gamma_scales: &[U256],
    severities: &[U256],
    tau: U256,
) -> Result<Vec<ScenarioRow>> {
    let mut rows = Vec::with_capacity(sigma_multipliers.len() * gamma_scales.len() * severities.len());
    for &multiplier in sigma_multipliers {
        let stdev = mul_div(level, multiplier, PPB_U256, "scenario stdev")?;
        for &gamma_scale in gamma_scales {
            let bucket = SpreadBucket::new(level, stdev, gamma_scale)?;
            let terms = bucket.spread_terms()?;
            let half_spread = bucket.optimal_half_spread()?;
            let signed_half = to_signed(half_spread, "scenario offsets")?;
            for &severity in severities {
                let q = severity_quantity(severity, &bucket, tau)?;
                let shift = reservation_shift(q, terms.gamma_stdev2, tau)?;
                let overflow = || Error::overflow("scenario offsets");
                rows.push(ScenarioRow {
                    level,
                    stdev,
                    gamma_scale,
                    severity,
                    half_spread,
                    shift,
                    bid_offset: shift.checked_sub(signed_half).ok_or_else(overflow)?,
                    ask_offset: shift.checked_add(signed_half).ok_or_else(overflow)?,
                    spread: checked_add(half_spread, half_spread, "scenario spread")?,
                });
            }
        }
    }
    Ok(rows)
}

/// The stress grid for a level: σ at ½, 1 and 2 times the level, gamma
/// scales 0, ½ and 1, severities 0, ½ and 1. Always 27 rows.
pub fn severity_scenarios(level: U256, tau: U256) -> Result<Vec<ScenarioRow>> {
    let grid = [PPB_U256 / U256::from(2u64), PPB_U256, PPB_U256 * U256::from(2u64)];
    let unit = [U256::ZERO, PPB_U256 / U256::from(2u64), PPB_U256];
    scenario_table(level, &grid, &unit, &unit, tau)
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;
    const MID: u128 = 2_000_000_000_000;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    fn i(v: i128) -> I256 {
        I256::try_from(v).unwrap()
    }

    #[test]
    fn test_inventory_quantity_modes() {
        // 20 ETH and 10k USDC at 2000: 5 ETH worth of asset1
        let inventory = Inventory::new(u(20 * E18), u(10_000 * E18));
        let q = |mode| inventory_quantity(mode, &inventory, u(MID), u(E18)).unwrap();
        assert_eq!(q(InventoryMode::NoInventory), I256::ZERO);
        assert_eq!(q(InventoryMode::Risky0Zero), i(20_000_000_000));
        assert_eq!(q(InventoryMode::Risky1Zero), i(5_000_000_000));
        assert_eq!(q(InventoryMode::ValueNeutral), i(15_000_000_000));
    }

    #[test]
    fn test_value_neutral_quantity_goes_negative() {
        let inventory = Inventory::new(u(E18), u(100_000 * E18));
        let q = inventory_quantity(InventoryMode::ValueNeutral, &inventory, u(MID), u(E18)).unwrap();
        assert_eq!(q, i(-49_000_000_000));
    }

    #[test]
    fn test_inventory_quantity_zero_inputs() {
        let inventory = Inventory::new(u(1), u(1));
        let err = inventory_quantity(InventoryMode::Risky0Zero, &inventory, U256::ZERO, u(E18));
        assert!(matches!(err, Err(Error::DivisionByZero { .. })));
        let err = inventory_quantity(InventoryMode::Risky0Zero, &inventory, u(MID), U256::ZERO);
        assert!(matches!(err, Err(Error::DivisionByZero { .. })));
    }

    #[test]
    fn test_shift_sign_follows_inventory() {
        // γσ² = 30 bps, τ = 1
        let g = u(30_000_000_000);
        let tau = u(1_000_000_000);
        // Long one unit: −30 bps
        assert_eq!(reservation_shift(i(1_000_000_000), g, tau).unwrap(), i(-3_000_000));
        // Short half a unit: +15 bps
        assert_eq!(reservation_shift(i(-500_000_000), g, tau).unwrap(), i(1_500_000));
        assert_eq!(reservation_shift(I256::ZERO, g, tau).unwrap(), I256::ZERO);
    }

    #[test]
    fn test_shift_scales_with_horizon() {
        let g = u(2_000_000_000);
        let q = i(15_000_000_000);
        let full = reservation_shift(q, g, u(1_000_000_000)).unwrap();
        let half = reservation_shift(q, g, u(500_000_000)).unwrap();
        // 15 × 2 bps
        assert_eq!(full, i(-3_000_000));
        assert_eq!(half, i(-1_500_000));
    }

    #[test]
    fn test_reservation_price() {
        assert_eq!(reservation_price(u(MID), i(-3_000_000)).unwrap(), u(1_994_000_000_000));
        assert_eq!(reservation_price(u(MID), i(1_500_000)).unwrap(), u(2_003_000_000_000));
        assert_eq!(reservation_price(u(MID), I256::ZERO).unwrap(), u(MID));
        // A shift of −100% or worse floors at zero
        assert_eq!(reservation_price(u(MID), i(-2_000_000_000)).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_bid_ask_around_offsets_by_mid() {
        // 2.5 bps half-spread around a centre 30 bps under mid
        let (bid, ask) = bid_ask_around(u(1_994_000_000_000), u(MID), u(250_000)).unwrap();
        assert_eq!(bid, u(1_993_500_000_000));
        assert_eq!(ask, u(1_994_500_000_000));
    }

    #[test]
    fn test_for_risky_mode() {
        assert_eq!(InventoryMode::for_risky_mode(RiskyMode::Neutral), InventoryMode::ValueNeutral);
        assert_eq!(InventoryMode::for_risky_mode(RiskyMode::Risky0), InventoryMode::Risky0Zero);
        assert_eq!(InventoryMode::for_risky_mode(RiskyMode::Risky1), InventoryMode::Risky1Zero);
    }

    #[test]
    fn test_inventory_mode_parse_roundtrip() {
        for mode in InventoryMode::ALL {
            assert_eq!(mode.to_string().parse::<InventoryMode>().unwrap(), mode);
        }
        assert!("sideways".parse::<InventoryMode>().is_err());
    }

    #[test]
    fn test_severity_quantity_maps_to_sigma_shift() {
        // level = σ = 30 bps, scale 1: γσ = 1, so q = severity
        let bucket = SpreadBucket::from_bps("30", "30", "1").unwrap();
        let tau = u(1_000_000_000);
        let q = severity_quantity(u(500_000_000), &bucket, tau).unwrap();
        assert_eq!(q, i(500_000_000));
        let g = bucket.spread_terms().unwrap().gamma_stdev2;
        // −½ × 30 bps
        assert_eq!(reservation_shift(q, g, tau).unwrap(), i(-1_500_000));
    }

    #[test]
    fn test_severity_quantity_zero_gamma() {
        let bucket = SpreadBucket::from_bps("30", "30", "0").unwrap();
        let q = severity_quantity(u(1_000_000_000), &bucket, u(1_000_000_000)).unwrap();
        assert_eq!(q, I256::ZERO);
    }

    #[test]
    fn test_severity_scenarios_30bps() {
        let rows = severity_scenarios(u(3_000_000), u(1_000_000_000)).unwrap();
        assert_eq!(rows.len(), 27);

        // First row: σ = 15 bps, no risk aversion, no stress
        let first = rows[0];
        assert_eq!(first.stdev, u(1_500_000));
        assert_eq!(first.half_spread, u(3_000_000));
        assert_eq!(first.shift, I256::ZERO);
        assert_eq!(first.bid_offset, i(-3_000_000));
        assert_eq!(first.ask_offset, i(3_000_000));
        assert_eq!(first.spread, u(6_000_000));

        // Every stressed row with gamma shifts by −severity·σ
        for row in rows.iter().filter(|r| !r.gamma_scale.is_zero()) {
            let expected = mul_div(row.severity, row.stdev, PPB_U256, "t").unwrap();
            assert_eq!(row.shift, I256::ZERO - to_signed(expected, "t").unwrap());
            assert_eq!(row.ask_offset - row.bid_offset, to_signed(row.spread, "t").unwrap());
        }
        // Gamma off: centred whatever the severity
        for row in rows.iter().filter(|r| r.gamma_scale.is_zero()) {
            assert_eq!(row.shift, I256::ZERO);
        }
    }

    #[test]
    fn test_scenario_row_serializes_as_strings() {
        let rows = severity_scenarios(u(3_000_000), u(1_000_000_000)).unwrap();
        let json = serde_json::to_value(rows[26]).unwrap();
        assert_eq!(json["level"], "3000000");
        assert_eq!(json["stdev"], "6000000");
        assert_eq!(json["shift"], "-6000000");
    }
}
