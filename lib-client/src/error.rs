//! Error types for the DEX client library
//!
//! One error type for every collaborator call (RPC, ABI, wallet context) so
//! orchestration code can convert any failure into a status value.

use thiserror::Error;

use lib_types::TxHash;

use crate::status::StatusError;

/// Client library error type
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// Wallet/client/address context missing before any network call
    #[error("Missing context: {0}")]
    MissingContext(&'static str),

    /// Wallet refused to sign
    #[error("User rejected the request")]
    UserRejected,

    /// Call would revert (simulation or estimation)
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Gas estimation failed for a reason other than a revert
    #[error("Gas estimation failed: {0}")]
    EstimateGas(String),

    /// Transaction was mined but reverted
    #[error("Transaction {0} failed on chain")]
    TxFailed(TxHash),

    /// Receipt did not show up in time
    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(TxHash),

    /// JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// HTTP or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// ABI encode/decode failure
    #[error("ABI error: {0}")]
    Abi(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Status store refused the transition
    #[error(transparent)]
    Status(#[from] StatusError),
}

impl ClientError {
    /// Hash of the broadcast transaction the error refers to, if any
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            ClientError::TxFailed(hash) | ClientError::ReceiptTimeout(hash) => Some(*hash),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationError(err.to_string())
    }
}

impl From<alloy_sol_types::Error> for ClientError {
    fn from(err: alloy_sol_types::Error) -> Self {
        ClientError::Abi(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<lib_types::TypesError> for ClientError {
    fn from(err: lib_types::TypesError) -> Self {
        ClientError::SerializationError(err.to_string())
    }
}
