//! Fixed-point Avellaneda-Stoikov quoting core.
//!
//! - **Skew**: trade-induced change in normalized inventory skew
//! - **Spread**: half-spread with the skew-driven inventory adjustment
//! - **Bucket**: spread terms derived from a level/volatility/gamma bucket
//! - **Reservation**: inventory-driven shift of the quote centre away from mid
//! - **Quoter**: skew → half-spread → bid/ask → amount out
//!
//! Everything here is a pure function of its inputs.

mod bucket;
mod config;
mod fixed;
mod quoter;
mod reservation;
mod skew;
mod spread;


pub use bucket::*;
pub use config::*;
pub use fixed::{
    format_decimal, format_decimal_half_even, format_decimal_trimmed, format_signed_decimal,
    format_skew, mul_div, parse_decimal, serialize_as_string, PPB_U256,
};
pub use quoter::*;
pub use reservation::*;
pub use skew::*;
pub use spread::*;
