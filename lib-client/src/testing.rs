//! In-memory collaborators for tests
//!
//! [`MockContractClient`] answers reads from canned responses keyed by
//! `(contract, selector)` (or exact calldata), records every write, and lets
//! a test inject a failure at any step of the submission pipeline.

use async_trait::async_trait;
use alloy_sol_types::SolCall;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use lib_types::{Address, Bytes, Gas, TxHash};

use crate::contract::{ContractCall, ContractClient, Log, LogFilter, Receipt};
use crate::error::{ClientError, Result};

#[derive(Debug)]
struct MockState {
    by_selector: HashMap<(Address, [u8; 4]), Bytes>,
    by_calldata: HashMap<(Address, Bytes), Bytes>,
    simulate_failure: Option<ClientError>,
    estimate_failure: Option<ClientError>,
    write_failure: Option<ClientError>,
    receipt_failure: Option<ClientError>,
    receipt_success: bool,
    gas_estimate: Gas,
    nonce: Option<u64>,
    write_delay: Option<Duration>,
    writes: Vec<ContractCall>,
    next_hash: u8,
    logs: Vec<Log>,
    block_number: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            by_selector: HashMap::new(),
            by_calldata: HashMap::new(),
            simulate_failure: None,
            estimate_failure: None,
            write_failure: None,
            receipt_failure: None,
            receipt_success: true,
            gas_estimate: 100_000,
            nonce: Some(0),
            write_delay: None,
            writes: Vec::new(),
            next_hash: 1,
            logs: Vec::new(),
            block_number: 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct MockContractClient {
    state: Mutex<MockState>,
}

impl MockContractClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `C` call on `to` with `data`
    pub fn respond<C: SolCall>(&self, to: Address, data: impl Into<Bytes>) {
        self.state.lock().by_selector.insert((to, C::SELECTOR), data.into());
    }

    /// Answer one exact call (selector plus arguments)
    pub fn respond_exact<C: SolCall>(&self, to: Address, call: &C, data: impl Into<Bytes>) {
        self.state
            .lock()
            .by_calldata
            .insert((to, call.abi_encode().into()), data.into());
    }

    pub fn fail_simulation(&self, err: ClientError) {
        self.state.lock().simulate_failure = Some(err);
    }

    pub fn fail_estimate(&self, err: ClientError) {
        self.state.lock().estimate_failure = Some(err);
    }

    pub fn fail_write(&self, err: ClientError) {
        self.state.lock().write_failure = Some(err);
    }

    pub fn fail_receipt(&self, err: ClientError) {
        self.state.lock().receipt_failure = Some(err);
    }

    /// Mine transactions as reverted
    pub fn revert_on_chain(&self) {
        self.state.lock().receipt_success = false;
    }

    pub fn set_gas_estimate(&self, gas: Gas) {
        self.state.lock().gas_estimate = gas;
    }

    pub fn set_nonce(&self, nonce: Option<u64>) {
        self.state.lock().nonce = nonce;
    }

    /// Delay between a write request and its hash (wallet prompt)
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    pub fn push_log(&self, log: Log) {
        self.state.lock().logs.push(log);
    }

    pub fn set_block_number(&self, block: u64) {
        self.state.lock().block_number = block;
    }

    pub fn writes(&self) -> Vec<ContractCall> {
        self.state.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    fn lookup(&self, call: &ContractCall) -> Option<Bytes> {
        let state = self.state.lock();
        if let Some(data) = state.by_calldata.get(&(call.to, call.data.clone())) {
            return Some(data.clone());
        }
        let selector = call.selector()?;
        state.by_selector.get(&(call.to, selector)).cloned()
    }
}

#[async_trait]
impl ContractClient for MockContractClient {
    async fn read(&self, call: &ContractCall) -> Result<Bytes> {
        self.lookup(call)
            .ok_or_else(|| ClientError::Reverted(format!("no mock response for call to {}", call.to)))
    }

    async fn estimate_gas(&self, _call: &ContractCall) -> Result<Gas> {
        let state = self.state.lock();
        match &state.estimate_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.gas_estimate),
        }
    }

    async fn simulate(&self, call: &ContractCall) -> Result<Bytes> {
        if let Some(err) = self.state.lock().simulate_failure.clone() {
            return Err(err);
        }
        Ok(self.lookup(call).unwrap_or_default())
    }

    async fn write(&self, call: &ContractCall) -> Result<TxHash> {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if let Some(err) = state.write_failure.clone() {
            return Err(err);
        }
        state.writes.push(call.clone());
        let hash = TxHash::new([state.next_hash; 32]);
        state.next_hash = state.next_hash.wrapping_add(1);
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        let state = self.state.lock();
        if let Some(err) = state.receipt_failure.clone() {
            return Err(err);
        }
        Ok(Receipt {
            tx_hash: hash,
            block_number: state.block_number,
            success: state.receipt_success,
            gas_used: state.gas_estimate,
            logs: Vec::new(),
        })
    }

    async fn transaction_nonce(&self, _hash: TxHash) -> Result<Option<u64>> {
        Ok(self.state.lock().nonce)
    }

    async fn logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| log.address == filter.address)
            .filter(|log| log.topics.first() == Some(&filter.topic0))
            .filter(|log| {
                log.block_number
                    .map_or(false, |b| b >= filter.from_block && b <= filter.to_block)
            })
            .cloned()
            .collect())
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state.lock().block_number)
    }
}
