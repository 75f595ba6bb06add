//! Governance Errors

use thiserror::Error;

use lib_client::ClientError;
use lib_types::Address;

use crate::tx::MultisigTxId;

/// Error during multisig operations
#[derive(Error, Debug, Clone)]
pub enum GovernanceError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Multisig address not configured")]
    MultisigNotConfigured,

    #[error("Transaction #{id} does not exist (multisig has {num_txs})")]
    UnknownTransaction { id: MultisigTxId, num_txs: u64 },

    #[error("Value of {field} does not fit in 64 bits")]
    ValueOverflow { field: &'static str },

    #[error("Malformed event from {address}: {reason}")]
    MalformedEvent { address: Address, reason: String },
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
