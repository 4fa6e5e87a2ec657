//! Precomputed Avellaneda-Stoikov spread terms.

use alloy::primitives::U256;

/// The base-spread components of one parameter bucket.
///
/// `inv_k`, `term2` and `term3` are in bps×1e5 and stand for `1/k`,
/// `γ/(2k²)` and `γσ²/2`. `gamma_stdev2` is `γσ²` in PPB and only feeds the
/// inventory adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpreadTerms {
    pub inv_k: U256,
    pub term2: U256,
    pub term3: U256,
    pub gamma_stdev2: U256,
}

impl SpreadTerms {
    pub fn new(inv_k: U256, term2: U256, term3: U256, gamma_stdev2: U256) -> Self {
        Self {
            inv_k,
            term2,
            term3,
            gamma_stdev2,
        }
    }
}
