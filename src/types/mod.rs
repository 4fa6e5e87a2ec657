//! Value types shared by the skew and spread calculators.
//!
//! Every quantity here is a fixed-point integer; see [`crate::consts`] for
//! the scales.

mod pool;
mod terms;
mod trade;

pub use pool::*;
pub use terms::*;
pub use trade::*;
