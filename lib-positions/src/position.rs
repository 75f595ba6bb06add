//! Position model and derived quantities
//!
//! Amounts, range status and ratio are recomputed from the raw record and the
//! pool's live state on every read.

use alloy_primitives::aliases::{I24, U24};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lib_client::abi::IERC20;
use lib_client::{read_call, ContractClient};
use lib_types::{format_units, Address, TokenInfo, U256};

use crate::abi::{IFactory, INonfungiblePositionManager, IPool};
use crate::errors::{PositionError, PositionResult};
use crate::price::{price_range_ratio, sqrt_price_to_price, tick_to_price};
use crate::tick_math::{amount0_delta, amount1_delta, sqrt_ratio_at_tick, MAX_TICK, MIN_TICK};

/// Live price of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    /// Fee tier in hundredths of a basis point
    pub fee: u32,
    /// `None` until slot0 has been read
    pub state: Option<PoolState>,
}

impl Pool {
    pub fn new(token0: TokenInfo, token1: TokenInfo, fee: u32) -> Self {
        Self {
            token0,
            token1,
            fee,
            state: None,
        }
    }

    pub fn with_state(mut self, state: PoolState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn tick(&self) -> Option<i32> {
        self.state.map(|s| s.tick)
    }

    /// True when either side is the given token, under any standard
    pub fn involves(&self, token: Address) -> bool {
        self.token0.addresses().any(|a| a == token) || self.token1.addresses().any(|a| a == token)
    }
}

/// Price bounds of a position, token0 quoted in token1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower: f64,
    pub upper: f64,
    pub current: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub token_id: U256,
    pub pool: Pool,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    pub fn new(
        token_id: U256,
        pool: Pool,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> PositionResult<Self> {
        validate_ticks(tick_lower, tick_upper)?;
        Ok(Self {
            token_id,
            pool,
            tick_lower,
            tick_upper,
            liquidity,
        })
    }

    /// `None` until the pool tick is known
    pub fn in_range(&self) -> Option<bool> {
        self.pool
            .tick()
            .map(|tick| tick >= self.tick_lower && tick < self.tick_upper)
    }

    pub fn removed(&self) -> bool {
        self.liquidity == 0
    }

    /// Token amounts the liquidity is worth at the current price
    pub fn amounts(&self) -> PositionResult<(U256, U256)> {
        let state = self.pool.state.ok_or(PositionError::PoolNotLoaded)?;
        let sqrt_lower = sqrt_ratio_at_tick(self.tick_lower)?;
        let sqrt_upper = sqrt_ratio_at_tick(self.tick_upper)?;

        if state.tick < self.tick_lower {
            Ok((amount0_delta(sqrt_lower, sqrt_upper, self.liquidity)?, U256::ZERO))
        } else if state.tick < self.tick_upper {
            Ok((
                amount0_delta(state.sqrt_price_x96, sqrt_upper, self.liquidity)?,
                amount1_delta(sqrt_lower, state.sqrt_price_x96, self.liquidity)?,
            ))
        } else {
            Ok((U256::ZERO, amount1_delta(sqrt_lower, sqrt_upper, self.liquidity)?))
        }
    }

    /// Amounts formatted with each token's decimals
    pub fn formatted_amounts(&self) -> PositionResult<(String, String)> {
        let (amount0, amount1) = self.amounts()?;
        Ok((
            format_units(amount0, self.pool.token0.decimals),
            format_units(amount1, self.pool.token1.decimals),
        ))
    }

    pub fn price_range(&self) -> PriceRange {
        let (d0, d1) = (self.pool.token0.decimals, self.pool.token1.decimals);
        PriceRange {
            lower: tick_to_price(self.tick_lower, d0, d1),
            upper: tick_to_price(self.tick_upper, d0, d1),
            current: self
                .pool
                .state
                .map(|s| sqrt_price_to_price(s.sqrt_price_x96, d0, d1)),
        }
    }

    /// Percentage held as token0; `None` until the pool is loaded
    pub fn ratio(&self) -> Option<u8> {
        let range = self.price_range();
        price_range_ratio(range.lower, range.current?, range.upper)
    }
}

fn validate_ticks(lower: i32, upper: i32) -> PositionResult<()> {
    for tick in [lower, upper] {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(PositionError::TickOutOfRange(tick));
        }
    }
    if lower >= upper {
        return Err(PositionError::InvalidTickRange { lower, upper });
    }
    Ok(())
}

pub(crate) fn tick_from_abi(tick: I24) -> i32 {
    // 24 bits always fit
    i32::try_from(tick).unwrap_or_default()
}

pub(crate) fn tick_to_abi(tick: i32) -> PositionResult<I24> {
    I24::try_from(tick).map_err(|_| PositionError::TickOutOfRange(tick))
}

pub(crate) fn fee_to_abi(fee: u32) -> PositionResult<U24> {
    if fee >= 1 << 24 {
        return Err(PositionError::Overflow("fee"));
    }
    Ok(U24::from(fee))
}

/// Symbol and decimals read from the token itself
async fn token_metadata(client: &dyn ContractClient, address: Address) -> TokenInfo {
    let symbol = read_call(client, address, &IERC20::symbolCall {}).await;
    let decimals = read_call(client, address, &IERC20::decimalsCall {}).await;
    match (symbol, decimals) {
        (Ok(symbol), Ok(decimals)) => TokenInfo::new(address, symbol._0, decimals._0),
        (symbol, decimals) => {
            warn!(
                "Token metadata for {} unavailable (symbol ok: {}, decimals ok: {})",
                address,
                symbol.is_ok(),
                decimals.is_ok()
            );
            TokenInfo::placeholder(address)
        }
    }
}

/// Live pool price; `None` when the pool does not exist or cannot be read
pub async fn fetch_pool_state(
    client: &dyn ContractClient,
    factory: Address,
    token0: Address,
    token1: Address,
    fee: u32,
) -> PositionResult<Option<PoolState>> {
    let pool = read_call(
        client,
        factory,
        &IFactory::getPoolCall {
            tokenA: token0,
            tokenB: token1,
            fee: fee_to_abi(fee)?,
        },
    )
    .await?
    .pool;
    if pool == Address::ZERO {
        return Ok(None);
    }

    match read_call(client, pool, &IPool::slot0Call {}).await {
        Ok(slot0) => Ok(Some(PoolState {
            sqrt_price_x96: U256::from_limbs_slice(slot0.sqrtPriceX96.as_limbs()),
            tick: tick_from_abi(slot0.tick),
        })),
        Err(e) => {
            debug!("slot0 of {} unavailable: {}", pool, e);
            Ok(None)
        }
    }
}

/// Read a position record, its tokens and the live pool price
pub async fn fetch_position(
    client: &dyn ContractClient,
    position_manager: Address,
    factory: Address,
    token_id: U256,
) -> PositionResult<Position> {
    let record = read_call(
        client,
        position_manager,
        &INonfungiblePositionManager::positionsCall { tokenId: token_id },
    )
    .await?;

    let fee = record.fee.to::<u32>();
    let token0 = token_metadata(client, record.token0).await;
    let token1 = token_metadata(client, record.token1).await;
    let state = fetch_pool_state(client, factory, record.token0, record.token1, fee).await?;

    let mut pool = Pool::new(token0, token1, fee);
    pool.state = state;

    Position::new(
        token_id,
        pool,
        tick_from_abi(record.tickLower),
        tick_from_abi(record.tickUpper),
        record.liquidity,
    )
}
