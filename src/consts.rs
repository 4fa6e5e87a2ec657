/// Parts-per-billion scale: an encoded `v` represents `v / 1e9`.
pub const PPB: u64 = 1_000_000_000;

/// Upper bound of a normalized skew (+1.0 in PPB). The lower bound is its negation.
pub const SKEW_BOUND: i64 = 1_000_000_000;

/// Basis-point scale used by the base spread terms: an encoded `v` represents `v / 1e5` bps.
///
/// Because `1 bps = 1e-4`, a bps×1e5 value is numerically the same as a
/// PPB-encoded fraction, so half-spreads can be applied directly to PPB prices.
pub const BPS_E5: u64 = 100_000;

/// Bridges `skew (PPB) × gammaStDev2 (PPB)` into the bps×1e5 domain of the base terms.
///
/// `1e9 × 1e9` carries the two PPB scales, `× 1e5` re-scales into bps×1e5:
/// `1e18 / 1e5 = 1e13`.
pub const SKEW_TO_SPREAD_DIVISOR: u64 = 10_000_000_000_000;

/// Number of decimal digits carried by [`PPB`].
pub const PPB_DECIMALS: u32 = 9;

/// Number of decimal digits carried by [`BPS_E5`].
pub const BPS_E5_DECIMALS: u32 = 5;
