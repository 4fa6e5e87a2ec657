#![deny(unreachable_pub)]

//! Fixed-point Avellaneda-Stoikov inventory skew and half-spread engine for
//! the Stoix AMM.
//!
//! The pool ledger supplies inventories, a mid price and bucket parameters;
//! this crate returns the trade-induced skew, the clamped half-spread and the
//! resulting quote, optionally centred on an inventory-shifted reservation
//! price. No floating point is used anywhere.

// Core modules
mod consts;
mod errors;
mod types;

// Feature modules
pub mod stoicov;

// Re-exports
pub use consts::{
    BPS_E5, BPS_E5_DECIMALS, PPB, PPB_DECIMALS, SKEW_BOUND, SKEW_TO_SPREAD_DIVISOR,
};
pub use errors::{Error, Result};
pub use stoicov::{
    bid_ask, bid_ask_around, calculate_half_spread_with_inventory, calculate_skew,
    inventory_quantity, reservation_price, reservation_shift, severity_scenarios, skew_at_state,
    standard_buckets, BucketConfig, BucketSummary, InventoryMode, LogFormat, LoggingConfig, Quote,
    QuoterConfig, QuoterSection, ReservationConfig, ReservationParams, ScenarioRow,
    SkewCalculator, SpreadBucket, SpreadCalculator, StoicovQuoter, STANDARD_LEVELS_BPS,
};
pub use types::*;

// 256-bit integer types used across the public API
pub use alloy::primitives::{I256, U256};
