//! Concentrated-liquidity positions
//!
//! Pure derivations (tick math, prices, in-range status, share ratio) plus the
//! write flows that touch a position: collect fees, remove liquidity, mint and
//! revoke. Writes go through [`lib_client::Submitter`] so every flow reports
//! the same status transitions.

pub mod abi;
pub mod add_liquidity;
pub mod collect;
pub mod errors;
pub mod fees;
pub mod position;
pub mod price;
pub mod remove_liquidity;
pub mod revoke;
pub mod tick_math;

pub use add_liquidity::{
    mint_call, AddLiquiditySnapshot, AddLiquidityStatus, AddLiquidityStore, LiquidityProvider,
    MintRequest,
};
pub use collect::{build_collect_calls, encode_multicall, tokens_out_code, CollectRequest, FeeCollector, Side};
pub use errors::{PositionError, PositionResult};
pub use fees::{simulate_fees, FeesOwed};
pub use position::{fetch_pool_state, fetch_position, Pool, PoolState, Position, PriceRange};
pub use price::{price_range_ratio, tick_to_price, to_significant};
pub use remove_liquidity::{
    build_remove_calls, liquidity_to_remove, LiquidityRemover, RemoveOptions, RemoveRequest,
};
pub use revoke::{estimate_revoke_gas, revoke};
pub use tick_math::{sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};
