//! Spread-term derivation from a bucket definition.
//!
//! A bucket fixes the target level `δ` and the volatility `σ` (both in bps)
//! plus a gamma scale `s`. With `k = 1/δ` and `γ = s·k`:
//!
//! ```text
//! 1/k          = δ
//! γ/(2k²)      = s·δ/2
//! γσ²/2        = s·σ²/(2δ)
//! γσ²          = s·σ²/δ
//! ```
//!
//! With `s = 1` and `σ = δ` the second and third terms cancel and the
//! optimal half-spread equals the level.

use alloy::primitives::U256;

use super::fixed::{mul_div, parse_decimal, PPB_U256};
use super::spread::calculate_half_spread_with_inventory;
use crate::consts::{BPS_E5, BPS_E5_DECIMALS, PPB_DECIMALS};
use crate::{Error, Result, SpreadTerms};

/// Target levels, in bps, of the standard bucket ladder.
pub const STANDARD_LEVELS_BPS: [&str; 16] = [
    "0.5", "1", "2.5", "5", "7.5", "10", "15", "20", "30", "50", "75", "100", "150", "200", "300",
    "500",
];

const BPS_E5_U256: U256 = U256::from_limbs([BPS_E5, 0, 0, 0]);

/// One parameter bucket in fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadBucket {
    /// Target level δ, bps×1e5
    pub level: U256,
    /// Volatility σ, bps×1e5
    pub stdev: U256,
    /// Gamma scale s, PPB
    pub gamma_scale: U256,
}

/// Every column of the bucket table for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSummary {
    pub bucket: SpreadBucket,
    /// k = 1/δ, PPB
    pub k: U256,
    /// γ = s·k, PPB
    pub gamma: U256,
    pub terms: SpreadTerms,
    /// invK − term2 + term3 clamped at zero, bps×1e5
    pub optimal_half_spread: U256,
    /// 2 × optimal half-spread, bps×1e5
    pub spread: U256,
}

impl SpreadBucket {
    pub fn new(level: U256, stdev: U256, gamma_scale: U256) -> Result<Self> {
        if level.is_zero() {
            return Err(Error::InvalidBucket("level must be greater than 0".to_string()));
        }
        Ok(Self {
            level,
            stdev,
            gamma_scale,
        })
    }

    /// Build from decimal strings: levels in bps, gamma scale as a plain ratio.
    pub fn from_bps(level_bps: &str, stdev_bps: &str, gamma_scale: &str) -> Result<Self> {
        let invalid = |e: Error| Error::InvalidBucket(e.to_string());
        Self::new(
            parse_decimal(level_bps, BPS_E5_DECIMALS).map_err(invalid)?,
            parse_decimal(stdev_bps, BPS_E5_DECIMALS).map_err(invalid)?,
            parse_decimal(gamma_scale, PPB_DECIMALS).map_err(invalid)?,
        )
    }

    /// `k = 1/δ_bps` in PPB.
    pub fn k(&self) -> Result<U256> {
        mul_div(PPB_U256, BPS_E5_U256, self.level, "bucket k")
    }

    /// `γ = s / δ_bps` in PPB.
    pub fn gamma(&self) -> Result<U256> {
        mul_div(self.gamma_scale, BPS_E5_U256, self.level, "bucket gamma")
    }

    pub fn spread_terms(&self) -> Result<SpreadTerms> {
        let stdev_sq = self
            .stdev
            .checked_mul(self.stdev)
            .ok_or_else(|| Error::overflow("bucket stdev²"))?;
        let two = U256::from(2u64);

        let term2 = mul_div(self.gamma_scale, self.level, PPB_U256 * two, "bucket term2")?;
        let term3_denominator = self
            .level
            .checked_mul(PPB_U256 * two)
            .ok_or_else(|| Error::overflow("bucket term3"))?;
        let term3 = mul_div(self.gamma_scale, stdev_sq, term3_denominator, "bucket term3")?;
        let gamma_denominator = self
            .level
            .checked_mul(BPS_E5_U256)
            .ok_or_else(|| Error::overflow("bucket gammaStDev2"))?;
        let gamma_stdev2 = mul_div(self.gamma_scale, stdev_sq, gamma_denominator, "bucket gammaStDev2")?;

        Ok(SpreadTerms::new(self.level, term2, term3, gamma_stdev2))
    }

    /// Half-spread with no inventory effect, bps×1e5.
    pub fn optimal_half_spread(&self) -> Result<U256> {
        let terms = self.spread_terms()?;
        calculate_half_spread_with_inventory(terms.inv_k, terms.term2, terms.term3, 0, terms.gamma_stdev2)
    }

    pub fn summary(&self) -> Result<BucketSummary> {
        let terms = self.spread_terms()?;
        let optimal_half_spread =
            calculate_half_spread_with_inventory(terms.inv_k, terms.term2, terms.term3, 0, terms.gamma_stdev2)?;
        let spread = optimal_half_spread
            .checked_mul(U256::from(2u64))
            .ok_or_else(|| Error::overflow("bucket spread"))?;
        Ok(BucketSummary {
            bucket: *self,
            k: self.k()?,
            gamma: self.gamma()?,
            terms,
            optimal_half_spread,
            spread,
        })
    }
}

/// One bucket per standard level with `σ = δ`.
pub fn standard_buckets(gamma_scale: U256) -> Result<Vec<SpreadBucket>> {
    STANDARD_LEVELS_BPS
        .iter()
        .map(|level| {
            let level = parse_decimal(level, BPS_E5_DECIMALS)?;
            SpreadBucket::new(level, level, gamma_scale)
        })
        .collect()
}
