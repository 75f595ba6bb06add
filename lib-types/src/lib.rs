//! DEX client primitives.
//! Stable, chain-neutral, behavior-free.
//!
//! Rule: amounts are integers in base units. Decimals only appear at the
//! formatting edge (`units`).

pub mod primitives;
pub mod token;
pub mod units;
pub mod errors;

pub use primitives::{Address, Bytes, ChainId, Gas, Timestamp, TxHash, B256, U256};
pub use token::{TokenInfo, TokenStandard, DEFAULT_DECIMALS, PLACEHOLDER_SYMBOL};
pub use units::{format_units, parse_units};
pub use errors::{TypesError, TypesResult};
