//! Q64.96 tick arithmetic
//!
//! Exact integer math matching the on-chain pool implementation. Prices are
//! `sqrt(1.0001^tick) * 2^96`; amounts are rounded down.

use alloy_primitives::U512;

use lib_types::U256;

use crate::errors::{PositionError, PositionResult};

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// `sqrt_ratio_at_tick(MIN_TICK)`
pub const MIN_SQRT_RATIO: u64 = 4_295_128_739;

const Q96_SHIFT: usize = 96;

// ratio multipliers for bits 1..=19 of |tick|, Q128
const MULTIPLIERS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x09aa508b5b7a84e1c677de54f3e99bc9,
    0x005d6af8dedb81196699c329225ee604,
    0x00002216e584f5fa1ea926041bedfe98,
    0x00000000048a170391f7dc42444e8fa2,
];

pub fn q96() -> U256 {
    U256::from(1u64) << Q96_SHIFT
}

/// `sqrt(1.0001^tick) * 2^96`
pub fn sqrt_ratio_at_tick(tick: i32) -> PositionResult<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(PositionError::TickOutOfRange(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 1 != 0 {
        U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        U256::from(1u64) << 128
    };
    for (bit, multiplier) in MULTIPLIERS.iter().enumerate() {
        if abs_tick & (2 << bit) != 0 {
            ratio = (ratio * U256::from(*multiplier)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up
    let round_up = if ratio % (U256::from(1u64) << 32) == U256::ZERO { 0u64 } else { 1u64 };
    Ok((ratio >> 32) + U256::from(round_up))
}

fn widen(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(value.as_limbs());
    U512::from_limbs(limbs)
}

fn narrow(value: U512) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// `floor(a * b / denominator)` without intermediate overflow
pub fn mul_div(a: U256, b: U256, denominator: U256) -> PositionResult<U256> {
    if denominator == U256::ZERO {
        return Err(PositionError::Overflow("mul_div"));
    }
    narrow(widen(a) * widen(b) / widen(denominator)).ok_or(PositionError::Overflow("mul_div"))
}

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

/// Token0 owed for `liquidity` between two sqrt prices
pub fn amount0_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> PositionResult<U256> {
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    if lower == U256::ZERO {
        return Err(PositionError::Overflow("amount0_delta"));
    }
    let numerator = U256::from(liquidity) << Q96_SHIFT;
    Ok(mul_div(numerator, upper - lower, upper)? / lower)
}

/// Token1 owed for `liquidity` between two sqrt prices
pub fn amount1_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> PositionResult<U256> {
    let (lower, upper) = ordered(sqrt_a, sqrt_b);
    mul_div(U256::from(liquidity), upper - lower, q96())
}
