//! DEX Client Library
//!
//! Shared plumbing for every write and read flow of the DEX client:
//!
//! - **Contract access**: [`ContractClient`] trait plus a JSON-RPC implementation
//! - **Status machine**: [`TxStatusStore`] (INITIAL → PENDING → LOADING → SUCCESS/ERROR)
//! - **Submission**: [`Submitter`] drives simulate → gas → write → receipt → notify
//! - **Gas policy**: estimate + margin, custom limit override, fixed fallbacks
//! - **Background work**: interval polling, event watching, bounded retry
//! - **Token permissions**: ERC-20 allowance and ERC-223 deposit
//!
//! # Example
//!
//! ```ignore
//! use lib_client::{GasSettings, Submitter, TracingSink, TxStatusStore, WalletContext};
//!
//! let submitter = Submitter::new(client, Arc::new(TracingSink));
//! let status = TxStatusStore::new();
//! let hash = submitter
//!     .submit(&status, &GasSettings::default(), &wallet, "Revoke", call)
//!     .await?;
//! ```

pub mod abi;
pub mod allowance;
pub mod contract;
pub mod error;
pub mod events;
pub mod gas;
pub mod notify;
pub mod poll;
pub mod retry;
pub mod rpc;
pub mod status;
pub mod submit;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod wallet;


pub use contract::{read_call, simulate_call, ContractCall, ContractClient, Log, LogFilter, Receipt};
pub use error::{ClientError, Result};
pub use events::{watch_events, EventStream, EventSubscription};
pub use gas::{estimate_gas_limit, GasSettings, GasSettingsStore};
pub use notify::{MemorySink, Notification, NotificationSink, TracingSink};
pub use poll::{spawn_poll, PollHandle};
pub use retry::{retry_optional, RetryPolicy};
pub use rpc::{JsonRpcClient, RpcConfig};
pub use status::{StatusError, StatusSnapshot, TxStatus, TxStatusStore};
pub use submit::{prepare_call, Submitter};
pub use wallet::WalletContext;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
