//! Half-spread with inventory adjustment.
//!
//! ```text
//! base       = 1/k − γ/(2k²) + γσ²/2              (bps×1e5)
//! adjustment = skew × γσ² / 1e13                  (PPB × PPB → bps×1e5)
//! half       = max(0, base + adjustment)
//! ```
//!
//! Arithmetic runs in 256-bit signed integers. Division truncates toward
//! zero. A negative total is an expected outcome for trades that improve
//! the pool's balance and clamps to zero rather than failing.

use alloy::primitives::{I256, U256};
use tracing::{debug, trace};

use super::fixed::to_signed;
use crate::consts::SKEW_TO_SPREAD_DIVISOR;
use crate::{Error, Result, SpreadTerms};

/// Base Avellaneda-Stoikov half-spread `invK − term2 + term3`, signed.
pub fn base_half_spread(inv_k: U256, term2: U256, term3: U256) -> Result<I256> {
    let inv_k = to_signed(inv_k, "invK")?;
    let term2 = to_signed(term2, "term2")?;
    let term3 = to_signed(term3, "term3")?;
    inv_k
        .checked_sub(term2)
        .and_then(|partial| partial.checked_add(term3))
        .ok_or_else(|| Error::overflow("base half-spread"))
}

/// Inventory term `skew × gammaStDev2 / 1e13`, in bps×1e5. Negative for negative skew.
pub fn inventory_adjustment(skew: i64, gamma_stdev2: U256) -> Result<I256> {
    let skew = I256::try_from(skew).map_err(|_| Error::overflow("skew"))?;
    let gamma_stdev2 = to_signed(gamma_stdev2, "gammaStDev2")?;
    let divisor = to_signed(U256::from(SKEW_TO_SPREAD_DIVISOR), "skew divisor")?;
    skew.checked_mul(gamma_stdev2)
        .ok_or_else(|| Error::overflow("inventory adjustment"))?
        .checked_div(divisor)
        .ok_or_else(|| Error::overflow("inventory adjustment"))
}

/// Final half-spread in bps×1e5, never negative.
///
/// # Arguments
/// - `inv_k`, `term2`, `term3`: base terms in bps×1e5
/// - `skew`: skew delta in PPB, as returned by `calculate_skew`
/// - `gamma_stdev2`: `γσ²` in PPB
///
/// # Errors
/// [`Error::Overflow`] when an input does not fit a signed 256-bit value or
/// the sum leaves that range.
pub fn calculate_half_spread_with_inventory(
    inv_k: U256,
    term2: U256,
    term3: U256,
    skew: i64,
    gamma_stdev2: U256,
) -> Result<U256> {
    let adjustment = inventory_adjustment(skew, gamma_stdev2)?;
    let base = base_half_spread(inv_k, term2, term3)?;
    let total = base
        .checked_add(adjustment)
        .ok_or_else(|| Error::overflow("half-spread"))?;

    trace!(%base, %adjustment, %total, skew, "Computed half-spread");

    if total.is_negative() {
        debug!(%total, skew, "Half-spread negative, clamping to zero");
        return Ok(U256::ZERO);
    }
    Ok(total.into_raw())
}

/// Applies one bucket's spread terms to skews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpreadCalculator {
    pub terms: SpreadTerms,
}

impl SpreadCalculator {
    pub fn new(terms: SpreadTerms) -> Self {
        Self { terms }
    }

    /// Half-spread for the given skew. See [`calculate_half_spread_with_inventory`].
    pub fn half_spread(&self, skew: i64) -> Result<U256> {
        calculate_half_spread_with_inventory(
            self.terms.inv_k,
            self.terms.term2,
            self.terms.term3,
            skew,
            self.terms.gamma_stdev2,
        )
    }

    /// Half-spread with no inventory effect.
    pub fn neutral_half_spread(&self) -> Result<U256> {
        self.half_spread(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SKEW_BOUND;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    /// 0.5 / 0.25 / 1.0 bps with γσ² = 2.0
    fn worked_example() -> SpreadTerms {
        SpreadTerms::new(u(50_000), u(25_000), u(100_000), u(2_000_000_000))
    }

    #[test]
    fn test_worked_positive_example() {
        let t = worked_example();
        let half = calculate_half_spread_with_inventory(t.inv_k, t.term2, t.term3, 800_000_000, t.gamma_stdev2)
            .unwrap();
        assert_eq!(half, u(285_000));
    }

    #[test]
    fn test_worked_negative_example_clamps() {
        let t = worked_example();
        let half = calculate_half_spread_with_inventory(t.inv_k, t.term2, t.term3, -900_000_000, t.gamma_stdev2)
            .unwrap();
        assert_eq!(half, U256::ZERO);
    }

    #[test]
    fn test_max_adverse_skew_never_wraps() {
        let calc = SpreadCalculator::new(worked_example());
        assert_eq!(calc.half_spread(-SKEW_BOUND).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_zero_skew_is_base_spread() {
        let calc = SpreadCalculator::new(worked_example());
        assert_eq!(calc.neutral_half_spread().unwrap(), u(125_000));
    }

    #[test]
    fn test_base_half_spread_can_be_negative() {
        let base = base_half_spread(u(10), u(50), u(5)).unwrap();
        assert!(base.is_negative());
        assert_eq!(
            calculate_half_spread_with_inventory(u(10), u(50), u(5), 0, U256::ZERO).unwrap(),
            U256::ZERO
        );
    }

    #[test]
    fn test_adjustment_truncates_toward_zero() {
        // -1 × 1 / 1e13 truncates to 0, not -1
        assert_eq!(inventory_adjustment(-1, u(1)).unwrap(), I256::ZERO);
        assert_eq!(inventory_adjustment(1, u(1)).unwrap(), I256::ZERO);
        assert_eq!(
            inventory_adjustment(-900_000_000, u(2_000_000_000)).unwrap(),
            I256::try_from(-180_000i64).unwrap()
        );
    }

    #[test]
    fn test_unsigned_input_beyond_signed_range_is_overflow() {
        let err = calculate_half_spread_with_inventory(U256::MAX, U256::ZERO, U256::ZERO, 0, U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }));
    }

    #[test]
    fn test_adjustment_product_overflow() {
        let huge = U256::MAX >> 2usize;
        let err = inventory_adjustment(SKEW_BOUND, huge).unwrap_err();
        assert!(matches!(err, Error::Overflow { .. }));
    }
}
