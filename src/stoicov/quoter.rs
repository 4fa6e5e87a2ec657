//! Quote composition: skew, half-spread and the resulting prices.

use alloy::primitives::U256;
use serde::Serialize;
use tracing::{debug, warn};

use super::bucket::SpreadBucket;
use super::config::QuoterConfig;
use super::fixed::{checked_add, mul_div, serialize_as_string, PPB_U256};
use super::reservation::{
    bid_ask_around, inventory_quantity, reservation_price, reservation_shift, ReservationParams,
};
use super::skew::SkewCalculator;
use super::spread::SpreadCalculator;
use crate::{Error, Inventory, Result, RiskyMode, SpreadTerms, SwapDirection, TradeDescriptor};

/// Result of quoting one trade. 256-bit fields serialize as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Skew delta the trade causes, PPB
    pub skew: i64,
    /// Half-spread, bps×1e5
    #[serde(serialize_with = "serialize_as_string")]
    pub half_spread: U256,
    /// Quote centre: mid, or the reservation price when enabled, PPB
    #[serde(serialize_with = "serialize_as_string")]
    pub reservation_price_ppb: U256,
    /// centre − half_spread × mid, PPB
    #[serde(serialize_with = "serialize_as_string")]
    pub bid_price_ppb: U256,
    /// centre + half_spread × mid, PPB
    #[serde(serialize_with = "serialize_as_string")]
    pub ask_price_ppb: U256,
    /// Output-asset amount the trader receives, rounded down
    #[serde(serialize_with = "serialize_as_string")]
    pub amount_out: U256,
}

/// Prices trades for one bucket and risk mode.
///
/// Holds no pool state; inventories and mid price come in with every call.
/// Quotes are centred on mid unless a reservation model is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoicovQuoter {
    skew: SkewCalculator,
    spread: SpreadCalculator,
    reservation: Option<ReservationParams>,
}

impl StoicovQuoter {
    pub fn new(terms: SpreadTerms, risky_mode: RiskyMode) -> Self {
        Self {
            skew: SkewCalculator::new(risky_mode),
            spread: SpreadCalculator::new(terms),
            reservation: None,
        }
    }

    /// Centre quotes on the inventory-shifted reservation price.
    pub fn with_reservation(mut self, params: ReservationParams) -> Self {
        self.reservation = Some(params);
        self
    }

    pub fn from_bucket(bucket: &SpreadBucket, risky_mode: RiskyMode) -> Result<Self> {
        Ok(Self::new(bucket.spread_terms()?, risky_mode))
    }

    pub fn from_config(config: &QuoterConfig) -> Result<Self> {
        let bucket = config.quoter.bucket.to_bucket()?;
        let quoter = Self::from_bucket(&bucket, config.quoter.risky_mode)?;
        match config.quoter.reservation_params()? {
            Some(params) => Ok(quoter.with_reservation(params)),
            None => Ok(quoter),
        }
    }

    pub fn risky_mode(&self) -> RiskyMode {
        self.skew.risky_mode
    }

    pub fn terms(&self) -> &SpreadTerms {
        &self.spread.terms
    }

    pub fn reservation(&self) -> Option<&ReservationParams> {
        self.reservation.as_ref()
    }

    pub fn quote(
        &self,
        inventory: Inventory,
        trade: TradeDescriptor,
        mid_price_ppb: U256,
    ) -> Result<Quote> {
        let skew = self.skew.calculate(&inventory, &trade, mid_price_ppb)?;
        let half_spread = self.spread.half_spread(skew)?;
        let (reservation_price_ppb, (bid_price_ppb, ask_price_ppb)) = match &self.reservation {
            None => (mid_price_ppb, bid_ask(mid_price_ppb, half_spread)?),
            Some(params) => {
                let q = inventory_quantity(
                    params.inventory_mode,
                    &inventory,
                    mid_price_ppb,
                    params.asset0_unit,
                )?;
                let shift = reservation_shift(q, self.spread.terms.gamma_stdev2, params.tau)?;
                let centre = reservation_price(mid_price_ppb, shift)?;
                debug!(%q, %shift, reservation = %centre, "Reservation price");
                (centre, bid_ask_around(centre, mid_price_ppb, half_spread)?)
            }
        };

        let amount_out = match trade.direction {
            // Trader sells asset0 into our bid
            SwapDirection::ZeroForOne => mul_div(trade.amount, bid_price_ppb, PPB_U256, "amount out")?,
            // Trader buys asset0 at our ask
            SwapDirection::OneForZero => mul_div(trade.amount, PPB_U256, ask_price_ppb, "amount out")?,
        };

        if bid_price_ppb.is_zero() {
            warn!(%half_spread, %mid_price_ppb, "Half-spread consumes the whole bid");
        }
        debug!(
            mode = %self.skew.risky_mode,
            skew,
            %half_spread,
            bid = %bid_price_ppb,
            ask = %ask_price_ppb,
            %amount_out,
            "Quoted trade"
        );

        Ok(Quote {
            skew,
            half_spread,
            reservation_price_ppb,
            bid_price_ppb,
            ask_price_ppb,
            amount_out,
        })
    }
}

/// Bid and ask around `mid` for a half-spread in bps×1e5 (a PPB fraction).
///
/// The bid floors at zero once the half-spread reaches 100%.
pub fn bid_ask(mid_price_ppb: U256, half_spread: U256) -> Result<(U256, U256)> {
    if mid_price_ppb.is_zero() {
        return Err(Error::division_by_zero("mid price"));
    }
    let bid = mul_div(
        mid_price_ppb,
        PPB_U256.saturating_sub(half_spread),
        PPB_U256,
        "bid price",
    )?;
    let ask = mul_div(
        mid_price_ppb,
        checked_add(PPB_U256, half_spread, "ask price")?,
        PPB_U256,
        "ask price",
    )?;
    Ok((bid, ask))
}
