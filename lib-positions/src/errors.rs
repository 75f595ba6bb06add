use thiserror::Error;

use lib_client::ClientError;

#[derive(Error, Debug)]
pub enum PositionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Tick {0} outside the supported range")]
    TickOutOfRange(i32),

    #[error("Invalid tick range: lower {lower} must be below upper {upper}")]
    InvalidTickRange { lower: i32, upper: i32 },

    #[error("Percentage must be between 1 and 100, got {0}")]
    InvalidPercentage(u8),

    #[error("Pool state not loaded")]
    PoolNotLoaded,

    #[error("Position has no liquidity")]
    NoLiquidity,

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("{symbol} has no {standard} address")]
    UnsupportedStandard {
        symbol: String,
        standard: lib_types::TokenStandard,
    },

    #[error("Add liquidity already in progress ({0})")]
    InFlight(crate::add_liquidity::AddLiquidityStatus),
}

pub type PositionResult<T> = std::result::Result<T, PositionError>;
