//! DEX Governance - Multisig Transaction Lifecycle
//!
//! Translates user intent into multisig writes and reconciles on-chain
//! records into displayable state.
//!
//! # Key Principles
//!
//! 1. **Two-level encoding**: governance actions (vote, execute, owner and
//!    parameter changes) are proposed to the multisig itself as
//!    `proposeTx(self, 0, inner_call)`
//! 2. **One write per action**: every action maps to exactly one transaction
//! 3. **Derived status**: executed → approved → pending, recomputed on read
//! 4. **Contract decides executability**: `canExecute` is `txAllowed(id)`
//!
//! # Usage
//!
//! ```ignore
//! use lib_governance::{MultisigAction, MultisigManager};
//!
//! let hash = manager
//!     .handle_action(&MultisigAction::Approve { id: 5 }, &wallet)
//!     .await?;
//! let view = manager.load_display(5, &wallet).await?;
//! ```

pub mod abi;
pub mod action;
pub mod auto_execute;
pub mod display;
pub mod errors;
pub mod manager;
pub mod registry;
pub mod tx;

pub use action::MultisigAction;
pub use auto_execute::{AutoExecuteHandle, AutoExecutor};
pub use display::{
    classify, derive_display, derive_status, Deadline, DisplayInputs, DisplayStatus,
    TransactionDisplayData, TxKind,
};
pub use errors::{GovernanceError, GovernanceResult};
pub use manager::{ManagerConfig, MultisigManager};
pub use registry::{resolve_or_fetch, resolve_token, ResolvedToken, TokenRegistry, TokenSource, UnknownTokenCache};
pub use tx::{MultisigConfig, MultisigTransaction, MultisigTxId};
