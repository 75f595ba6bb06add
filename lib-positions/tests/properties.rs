use proptest::prelude::*;

use lib_positions::{price_range_ratio, sqrt_ratio_at_tick, tokens_out_code, MAX_TICK, MIN_TICK};
use lib_types::TokenStandard;

fn standard() -> impl Strategy<Value = TokenStandard> {
    prop_oneof![Just(TokenStandard::Erc20), Just(TokenStandard::Erc223)]
}

proptest! {
    #[test]
    fn ratio_below_range_is_all_token0(lower in 0.001f64..1000.0, width in 0.01f64..10.0, gap in 0.01f64..0.99) {
        let current = lower * gap;
        prop_assume!(current < lower);
        prop_assert_eq!(price_range_ratio(lower, current, lower * (1.0 + width)), Some(100));
    }

    #[test]
    fn ratio_above_range_is_all_token1(lower in 0.001f64..1000.0, width in 0.01f64..10.0, over in 1.01f64..10.0) {
        let upper = lower * (1.0 + width);
        prop_assert_eq!(price_range_ratio(lower, upper * over, upper), Some(0));
    }

    #[test]
    fn ratio_in_range_is_a_percentage(lower in 0.001f64..1000.0, width in 0.01f64..10.0, at in 0.0f64..=1.0) {
        let upper = lower * (1.0 + width);
        let current = lower + (upper - lower) * at;
        if let Some(ratio) = price_range_ratio(lower, current, upper) {
            prop_assert!(ratio <= 100);
        }
    }

    #[test]
    fn tokens_out_code_is_total_and_distinct(a in standard(), b in standard()) {
        let code = tokens_out_code(a, b);
        prop_assert!(code <= 3);
        let first_bit = u8::from(a == TokenStandard::Erc223) << 1;
        let second_bit = u8::from(b == TokenStandard::Erc223);
        prop_assert_eq!(code, first_bit | second_bit);
    }

    #[test]
    fn sqrt_ratio_is_monotonic(tick in (MIN_TICK + 1)..=MAX_TICK) {
        prop_assert!(sqrt_ratio_at_tick(tick - 1).unwrap() < sqrt_ratio_at_tick(tick).unwrap());
    }
}
