//! Human-facing prices
//!
//! Floating point is confined to display values. Every input is bounded to
//! 15 significant digits before comparison so that values which differ only
//! in the noise of their origin compare equal.

use lib_types::U256;

use crate::tick_math::q96;

pub const SIGNIFICANT_DIGITS: usize = 15;

/// Round `value` to `digits` significant digits
pub fn to_significant(value: f64, digits: usize) -> f64 {
    if !value.is_finite() || value == 0.0 || digits == 0 {
        return value;
    }
    format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Price of token0 in token1 at `tick`, adjusted for decimals
pub fn tick_to_price(tick: i32, decimals0: u8, decimals1: u8) -> f64 {
    let raw = 1.0001f64.powi(tick);
    raw * 10f64.powi(i32::from(decimals0) - i32::from(decimals1))
}

/// Price of token0 in token1 from a Q64.96 square root
pub fn sqrt_price_to_price(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> f64 {
    let sqrt = u256_to_f64(sqrt_price_x96) / u256_to_f64(q96());
    sqrt * sqrt * 10f64.powi(i32::from(decimals0) - i32::from(decimals1))
}

fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

/// Share of the position held as token0, in percent
///
/// `current` below the range means the position is entirely token0 (100),
/// above means entirely token1 (0). Non-finite or out-of-bounds results are
/// reported as `None` rather than clamped.
pub fn price_range_ratio(lower: f64, current: f64, upper: f64) -> Option<u8> {
    let l = to_significant(lower, SIGNIFICANT_DIGITS);
    let c = to_significant(current, SIGNIFICANT_DIGITS);
    let u = to_significant(upper, SIGNIFICANT_DIGITS);

    if c < l {
        return Some(100);
    }
    if c > u {
        return Some(0);
    }

    let sqrt_lu = (l * u).sqrt();
    let sqrt_uc = (u * c).sqrt();
    let ratio = (100.0 / ((sqrt_lu - sqrt_uc) / (c - sqrt_uc) + 1.0)).floor();

    if !ratio.is_finite() || !(0.0..=100.0).contains(&ratio) {
        return None;
    }
    Some(ratio as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick_math::sqrt_ratio_at_tick;

    #[test]
    fn test_outside_range() {
        assert_eq!(price_range_ratio(1.0, 0.5, 4.0), Some(100));
        assert_eq!(price_range_ratio(1.0, 5.0, 4.0), Some(0));
    }

    #[test]
    fn test_geometric_midpoint_is_half() {
        assert_eq!(price_range_ratio(1.0, 2.0, 4.0), Some(50));
    }

    #[test]
    fn test_at_lower_bound_is_all_token0() {
        assert_eq!(price_range_ratio(1.0, 1.0, 4.0), Some(100));
    }

    #[test]
    fn test_degenerate_range_is_none() {
        assert_eq!(price_range_ratio(2.0, 2.0, 2.0), None);
    }

    #[test]
    fn test_noise_below_fifteen_digits_is_ignored() {
        assert_eq!(to_significant(0.999_999_999_999_999_8, SIGNIFICANT_DIGITS), 1.0);
        assert_eq!(to_significant(4.000_000_000_000_001, SIGNIFICANT_DIGITS), 4.0);
        assert_eq!(price_range_ratio(1.0, 4.000_000_000_000_001, 4.0), Some(0));
    }

    #[test]
    fn test_significant_rounding() {
        assert_eq!(to_significant(123.456, 4), 123.5);
        assert_eq!(to_significant(0.000_123_456, 2), 0.00012);
        assert_eq!(to_significant(0.0, 5), 0.0);
    }

    #[test]
    fn test_tick_price_with_decimals() {
        assert!((tick_to_price(0, 18, 18) - 1.0).abs() < 1e-12);
        // 1 token0 (18 dec) = 1 token1 (6 dec) at tick 0 raw => 1e12 adjusted
        assert!((tick_to_price(0, 18, 6) - 1e12).abs() < 1.0);
        let p = tick_to_price(6932, 18, 18);
        assert!((p - 2.0).abs() < 1e-3, "{}", p);
    }

    #[test]
    fn test_sqrt_price_matches_tick_price() {
        let sqrt = sqrt_ratio_at_tick(1000).unwrap();
        let from_sqrt = sqrt_price_to_price(sqrt, 18, 18);
        assert!((from_sqrt - tick_to_price(1000, 18, 18)).abs() < 1e-9);
    }
}
