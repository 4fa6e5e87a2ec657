//! 256-bit fixed-point helpers shared by the calculators.
//!
//! Every helper is checked: an out-of-range intermediate becomes
//! [`Error::Overflow`] instead of wrapping.

use alloy::primitives::{I256, U256};

use crate::consts::{PPB, SKEW_BOUND};
use crate::{Error, Result};

/// `PPB` as a 256-bit constant.
pub const PPB_U256: U256 = U256::from_limbs([PPB, 0, 0, 0]);

/// `floor(a × b / denominator)`.
pub fn mul_div(a: U256, b: U256, denominator: U256, operation: &'static str) -> Result<U256> {
    if denominator.is_zero() {
        return Err(Error::division_by_zero(operation));
    }
    a.checked_mul(b)
        .ok_or_else(|| Error::overflow(operation))?
        .checked_div(denominator)
        .ok_or_else(|| Error::division_by_zero(operation))
}

pub(crate) fn checked_add(a: U256, b: U256, operation: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or_else(|| Error::overflow(operation))
}

/// Narrow a value that the caller has bounded to a skew-sized range.
pub(crate) fn to_i64(value: U256, operation: &'static str) -> Result<i64> {
    let narrow = u64::try_from(value).map_err(|_| Error::overflow(operation))?;
    i64::try_from(narrow).map_err(|_| Error::overflow(operation))
}

pub(crate) fn to_signed(value: U256, operation: &'static str) -> Result<I256> {
    I256::try_from(value).map_err(|_| Error::overflow(operation))
}

/// Clamp a raw skew to `[-SKEW_BOUND, SKEW_BOUND]`.
pub(crate) fn clamp_skew(skew: i64) -> i64 {
    skew.clamp(-SKEW_BOUND, SKEW_BOUND)
}

/// `10^exp` as U256.
pub(crate) fn pow10(exp: u32) -> U256 {
    (0..exp).fold(U256::from(1u64), |acc, _| acc * U256::from(10u64))
}

/// Parse a non-negative decimal string (`"7.5"`, `"30"`, `"0.25"`) into a
/// fixed-point integer with `decimals` fractional digits.
///
/// Rejects signs, exponents, empty parts and more fractional digits than
/// the scale can hold. No floating point is involved.
pub fn parse_decimal(s: &str, decimals: u32) -> Result<U256> {
    let s = s.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(Error::InvalidConfig(format!("empty decimal '{s}'")));
    }
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(Error::InvalidConfig(format!("not a decimal number: '{s}'")));
    }
    if frac_part.len() > decimals as usize {
        return Err(Error::InvalidConfig(format!(
            "'{s}' has more than {decimals} fractional digits"
        )));
    }

    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .map_err(|e| Error::InvalidConfig(format!("'{s}': {e}")))?
    };
    let mut padded = frac_part.to_string();
    while padded.len() < decimals as usize {
        padded.push('0');
    }
    let frac_value = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10)
            .map_err(|e| Error::InvalidConfig(format!("'{s}': {e}")))?
    };

    int_value
        .checked_mul(pow10(decimals))
        .and_then(|scaled| scaled.checked_add(frac_value))
        .ok_or_else(|| Error::overflow("decimal parse"))
}

#[derive(Clone, Copy)]
enum Rounding {
    HalfUp,
    HalfEven,
}

fn round_to_places(value: U256, drop: u32, rounding: Rounding) -> U256 {
    if drop == 0 {
        return value;
    }
    let unit = pow10(drop);
    let quotient = value / unit;
    let remainder = value % unit;
    let half = unit / U256::from(2u64);
    let round_up = match rounding {
        Rounding::HalfUp => remainder >= half,
        Rounding::HalfEven => remainder > half || (remainder == half && quotient.bit(0)),
    };
    if round_up {
        quotient.saturating_add(U256::from(1u64))
    } else {
        quotient
    }
}

fn render(value: U256, decimals: u32, places: u32, rounding: Rounding) -> String {
    let places = places.min(decimals);
    let rounded = round_to_places(value, decimals - places, rounding);
    if places == 0 {
        return rounded.to_string();
    }
    let unit = pow10(places);
    let int_part = rounded / unit;
    let frac_part = (rounded % unit).to_string();
    format!(
        "{int_part}.{frac_part:0>width$}",
        width = places as usize
    )
}

/// Render a fixed-point integer with `decimals` fractional digits, rounded
/// half-up to `places` digits.
pub fn format_decimal(value: U256, decimals: u32, places: u32) -> String {
    render(value, decimals, places, Rounding::HalfUp)
}

/// Like [`format_decimal`] but ties go to the even digit, which is what
/// printf-style `%.Nf` does for values that are exact in binary.
pub fn format_decimal_half_even(value: U256, decimals: u32, places: u32) -> String {
    render(value, decimals, places, Rounding::HalfEven)
}

/// Shortest exact rendering: trailing fractional zeros and a bare point are
/// dropped (`0.50000` prints as `0.5`, `30.00000` as `30`).
pub fn format_decimal_trimmed(value: U256, decimals: u32) -> String {
    let full = render(value, decimals, decimals, Rounding::HalfUp);
    if !full.contains('.') {
        return full;
    }
    full.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Signed counterpart of [`format_decimal_half_even`].
pub fn format_signed_decimal(value: I256, decimals: u32, places: u32) -> String {
    let body = format_decimal_half_even(value.unsigned_abs(), decimals, places);
    if value.is_negative() && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{body}")
    } else {
        body
    }
}

/// Serialize any displayable integer as a JSON string so 256-bit values
/// survive consumers limited to f64 numbers.
pub fn serialize_as_string<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}

/// Render a signed skew in PPB as a decimal.
pub fn format_skew(skew: i64) -> String {
    let sign = if skew < 0 { "-" } else { "" };
    let abs = U256::from(skew.unsigned_abs());
    format!(
        "{sign}{}",
        format_decimal(abs, crate::consts::PPB_DECIMALS, crate::consts::PPB_DECIMALS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floors() {
        let out = mul_div(U256::from(10u64), U256::from(3u64), U256::from(4u64), "t").unwrap();
        assert_eq!(out, U256::from(7u64));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        let err = mul_div(U256::from(1u64), U256::from(1u64), U256::ZERO, "t").unwrap_err();
        assert_eq!(err, Error::division_by_zero("t"));
    }

    #[test]
    fn test_mul_div_overflow() {
        let err = mul_div(U256::MAX, U256::from(2u64), U256::from(1u64), "t").unwrap_err();
        assert_eq!(err, Error::overflow("t"));
    }

    #[test]
    fn test_to_i64_bounds() {
        assert_eq!(to_i64(U256::from(PPB), "t").unwrap(), 1_000_000_000);
        assert!(to_i64(U256::from(u64::MAX), "t").is_err());
        assert!(to_i64(U256::MAX, "t").is_err());
    }

    #[test]
    fn test_clamp_skew() {
        assert_eq!(clamp_skew(2_000_000_000), SKEW_BOUND);
        assert_eq!(clamp_skew(-2_000_000_000), -SKEW_BOUND);
        assert_eq!(clamp_skew(123), 123);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0.5", 5).unwrap(), U256::from(50_000u64));
        assert_eq!(parse_decimal("30", 5).unwrap(), U256::from(3_000_000u64));
        assert_eq!(parse_decimal("7.5", 5).unwrap(), U256::from(750_000u64));
        assert_eq!(parse_decimal(".25", 9).unwrap(), U256::from(250_000_000u64));
        assert_eq!(parse_decimal("1.", 9).unwrap(), U256::from(PPB));
    }

    #[test]
    fn test_parse_decimal_rejects_bad_input() {
        assert!(parse_decimal("", 5).is_err());
        assert!(parse_decimal(".", 5).is_err());
        assert!(parse_decimal("-1", 5).is_err());
        assert!(parse_decimal("1e3", 5).is_err());
        assert!(parse_decimal("0.000001", 5).is_err());
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(U256::from(50_000u64), 5, 2), "0.50");
        assert_eq!(format_decimal(U256::from(285_000u64), 5, 2), "2.85");
        assert_eq!(format_decimal(U256::from(2_000_000_000u64), 9, 6), "2.000000");
        assert_eq!(format_decimal(U256::from(12_345u64), 5, 0), "0");
        // half-up
        assert_eq!(format_decimal(U256::from(125u64), 3, 2), "0.13");
    }

    #[test]
    fn test_format_decimal_half_even() {
        // 0.5, 2.5 and 7.5 land on the even neighbour
        assert_eq!(format_decimal_half_even(U256::from(50_000u64), 5, 0), "0");
        assert_eq!(format_decimal_half_even(U256::from(250_000u64), 5, 0), "2");
        assert_eq!(format_decimal_half_even(U256::from(750_000u64), 5, 0), "8");
        assert_eq!(format_decimal_half_even(U256::from(50_001u64), 5, 0), "1");
        assert_eq!(format_decimal_half_even(U256::from(125u64), 3, 2), "0.12");
        assert_eq!(format_decimal_half_even(U256::from(135u64), 3, 2), "0.14");
    }

    #[test]
    fn test_format_decimal_trimmed() {
        assert_eq!(format_decimal_trimmed(U256::from(50_000u64), 5), "0.5");
        assert_eq!(format_decimal_trimmed(U256::from(750_000u64), 5), "7.5");
        assert_eq!(format_decimal_trimmed(U256::from(50_000_000u64), 5), "500");
        assert_eq!(format_decimal_trimmed(U256::ZERO, 5), "0");
        assert_eq!(format_decimal_trimmed(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_format_signed_decimal() {
        let neg = I256::try_from(-3_000_000i64).unwrap();
        assert_eq!(format_signed_decimal(neg, 5, 2), "-30.00");
        let pos = I256::try_from(1_500_000i64).unwrap();
        assert_eq!(format_signed_decimal(pos, 5, 2), "15.00");
        // no negative zero
        let tiny = I256::try_from(-1i64).unwrap();
        assert_eq!(format_signed_decimal(tiny, 5, 2), "0.00");
    }

    #[test]
    fn test_serialize_as_string() {
        #[derive(serde::Serialize)]
        struct Wrapped {
            #[serde(serialize_with = "serialize_as_string")]
            value: U256,
        }
        let json = serde_json::to_string(&Wrapped { value: U256::MAX }).unwrap();
        assert_eq!(json, format!("{{\"value\":\"{}\"}}", U256::MAX));
    }

    #[test]
    fn test_format_skew() {
        assert_eq!(format_skew(-40_000_000), "-0.040000000");
        assert_eq!(format_skew(SKEW_BOUND), "1.000000000");
    }
}
