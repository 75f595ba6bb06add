//! Contract-call client abstraction
//!
//! Every on-chain interaction goes through [`ContractClient`]. The trait is
//! deliberately shaped like the RPC node (read / estimate / simulate / write /
//! wait) so flows can be tested against an in-memory implementation.

use async_trait::async_trait;
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};

use lib_types::{Address, Bytes, Gas, TxHash, B256, U256};

use crate::error::{ClientError, Result};

/// A single call against a contract
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractCall {
    /// Sender; required for simulate/write, optional for reads
    pub from: Option<Address>,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    /// Gas limit attached at submission time
    pub gas: Option<Gas>,
}

impl ContractCall {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            value: U256::ZERO,
            data: data.into(),
            gas: None,
        }
    }

    /// Build a call from a typed ABI call
    pub fn encode<C: SolCall>(to: Address, call: &C) -> Self {
        Self::new(to, call.abi_encode())
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas(mut self, gas: Gas) -> Self {
        self.gas = Some(gas);
        self
    }

    /// 4-byte function selector, if the payload has one
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<u64>,
    pub tx_hash: Option<TxHash>,
    pub log_index: Option<u64>,
}

/// Log query for one event signature on one contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub topic0: B256,
    pub from_block: u64,
    pub to_block: u64,
}

/// Mined transaction receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
    pub gas_used: Gas,
    pub logs: Vec<Log>,
}

/// Contract-call client (RPC node + signer)
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// `eth_call` against latest state
    async fn read(&self, call: &ContractCall) -> Result<Bytes>;

    /// Gas estimate for `call` as sent by `call.from`
    async fn estimate_gas(&self, call: &ContractCall) -> Result<Gas>;

    /// Dry-run a state-changing call; returns the would-be return data
    async fn simulate(&self, call: &ContractCall) -> Result<Bytes>;

    /// Sign and broadcast; returns once the hash is known
    async fn write(&self, call: &ContractCall) -> Result<TxHash>;

    /// Block until the transaction is mined
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt>;

    /// Sender nonce of a known transaction; `None` while the node doesn't know it yet
    async fn transaction_nonce(&self, hash: TxHash) -> Result<Option<u64>>;

    /// Logs matching `filter`
    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>>;

    /// Latest block number
    async fn block_number(&self) -> Result<u64>;
}

/// Read and decode a typed call
pub async fn read_call<C: SolCall>(
    client: &dyn ContractClient,
    to: Address,
    call: &C,
) -> Result<C::Return> {
    let raw = client.read(&ContractCall::encode(to, call)).await?;
    C::abi_decode_returns(&raw, true).map_err(ClientError::from)
}

/// Simulate and decode a typed call sent from `from`
pub async fn simulate_call<C: SolCall>(
    client: &dyn ContractClient,
    from: Address,
    to: Address,
    call: &C,
) -> Result<C::Return> {
    let raw = client
        .simulate(&ContractCall::encode(to, call).with_from(from))
        .await?;
    C::abi_decode_returns(&raw, true).map_err(ClientError::from)
}
