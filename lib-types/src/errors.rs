//! Primitive parsing errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid decimal amount '{0}'")]
    InvalidAmount(String),

    #[error("Too many fractional digits: {digits} > {decimals}")]
    TooManyDecimals { digits: usize, decimals: u8 },
}

pub type TypesResult<T> = Result<T, TypesError>;
