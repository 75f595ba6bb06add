//! Base-unit <-> decimal string conversion

use crate::errors::{TypesError, TypesResult};
use crate::primitives::U256;

/// Render a base-unit amount with `decimals` fractional digits, trailing zeros trimmed
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Parse a decimal string into base units
pub fn parse_units(value: &str, decimals: u8) -> TypesResult<U256> {
    let value = value.trim();
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    let valid = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !valid(int_part) || !valid(frac_part) {
        return Err(TypesError::InvalidAmount(value.to_string()));
    }
    if frac_part.len() > decimals as usize {
        return Err(TypesError::TooManyDecimals {
            digits: frac_part.len(),
            decimals,
        });
    }

    let combined = format!(
        "{}{}{}",
        int_part,
        frac_part,
        "0".repeat(decimals as usize - frac_part.len())
    );
    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(combined, 10).map_err(|_| TypesError::InvalidAmount(value.to_string()))
}
