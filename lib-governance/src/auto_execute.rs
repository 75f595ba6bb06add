//! Auto-execution for single-signature multisigs
//!
//! When the vote threshold is 1 a proposal is executable as soon as it is
//! mined. The executor listens for `TransactionProposed` and calls
//! `executeTx(id)` directly. The direct entrypoint keeps the chain finite: a
//! proposed `executeTx` would itself emit `TransactionProposed`.
//!
//! Each id is claimed in a seen-set before any network call, so duplicate log
//! delivery produces at most one `executeTx`. A claim is released when the
//! flow fails before anything was broadcast, so a redelivered log retries.

use alloy_sol_types::SolEvent;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use lib_client::{
    watch_events, ClientError, ContractCall, EventSubscription, GasSettingsStore, Log,
    StatusError, Submitter, TxStatusStore, WalletContext,
};
use lib_types::{Address, TxHash, U256};

use crate::abi::IMultisig;
use crate::errors::{GovernanceError, GovernanceResult};
use crate::tx::{fetch_vote_pass_threshold, to_u64, MultisigTxId};

pub struct AutoExecutor {
    multisig: Address,
    submitter: Submitter,
    wallet: WalletContext,
    gas: Arc<GasSettingsStore>,
    /// Independent of the manager's store
    status: Arc<TxStatusStore>,
    seen: Mutex<HashSet<MultisigTxId>>,
}

impl AutoExecutor {
    pub fn new(
        multisig: Address,
        submitter: Submitter,
        wallet: WalletContext,
        gas: Arc<GasSettingsStore>,
        status: Arc<TxStatusStore>,
    ) -> Self {
        Self {
            multisig,
            submitter,
            wallet,
            gas,
            status,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn status(&self) -> &Arc<TxStatusStore> {
        &self.status
    }

    pub fn has_seen(&self, id: MultisigTxId) -> bool {
        self.seen.lock().contains(&id)
    }

    /// Decode a `TransactionProposed` log into its transaction id
    pub fn decode_proposed(&self, log: &Log) -> GovernanceResult<MultisigTxId> {
        let malformed = |reason: String| GovernanceError::MalformedEvent {
            address: log.address,
            reason,
        };
        if log.address != self.multisig {
            return Err(malformed("log from a different contract".into()));
        }
        let event = IMultisig::TransactionProposed::decode_raw_log(
            log.topics.iter().copied(),
            &log.data,
            true,
        )
        .map_err(|e| malformed(e.to_string()))?;
        to_u64(event.txId, "txId")
    }

    /// React to one proposal; returns the `executeTx` hash if one was sent
    pub async fn on_proposed(&self, id: MultisigTxId) -> GovernanceResult<Option<TxHash>> {
        if !self.seen.lock().insert(id) {
            debug!("Proposal #{} already handled", id);
            return Ok(None);
        }

        let client = self.submitter.client().as_ref();
        let threshold = match fetch_vote_pass_threshold(client, self.multisig).await {
            Ok(threshold) => threshold,
            Err(e) => {
                self.release(id);
                return Err(e);
            }
        };
        if threshold != U256::from(1u64) {
            debug!("Proposal #{}: threshold {} needs votes", id, threshold);
            return Ok(None);
        }

        let call = ContractCall::encode(
            self.multisig,
            &IMultisig::executeTxCall { txId: U256::from(id) },
        );
        info!("Auto-executing multisig tx #{}", id);

        let result = self
            .submitter
            .submit(
                &self.status,
                &self.gas.get(),
                &self.wallet,
                &format!("Auto-execute multisig tx #{}", id),
                call,
            )
            .await;
        match result {
            Ok(hash) => Ok(Some(hash)),
            Err(e) => {
                if !self.was_broadcast(&e) {
                    self.release(id);
                }
                Err(e.into())
            }
        }
    }

    fn release(&self, id: MultisigTxId) {
        self.seen.lock().remove(&id);
        debug!("Proposal #{} released for redelivery", id);
    }

    /// Whether a failed submission got as far as a transaction hash
    fn was_broadcast(&self, err: &ClientError) -> bool {
        match err {
            e if e.tx_hash().is_some() => true,
            // the store was never claimed, any hash in it is stale
            ClientError::MissingContext(_) | ClientError::Status(StatusError::InFlight(_)) => false,
            _ => self.status.hash().is_some(),
        }
    }

    pub async fn handle_log(&self, log: &Log) -> GovernanceResult<Option<TxHash>> {
        let id = self.decode_proposed(log)?;
        self.on_proposed(id).await
    }

    /// Subscribe to proposals and auto-execute in the background
    pub fn spawn(self: Arc<Self>, from_block: Option<u64>, poll_interval: Duration) -> AutoExecuteHandle {
        let mut subscription = EventSubscription::new(
            self.multisig,
            IMultisig::TransactionProposed::SIGNATURE_HASH,
        )
        .poll_interval(poll_interval);
        if let Some(block) = from_block {
            subscription = subscription.from_block(block);
        }
        let mut stream = watch_events(self.submitter.client().clone(), subscription);

        info!("🔁 Auto-executor watching {}", self.multisig);
        let task = tokio::spawn(async move {
            while let Some(log) = stream.next().await {
                match self.handle_log(&log).await {
                    Ok(Some(hash)) => info!("Auto-execute sent: {}", hash),
                    Ok(None) => {}
                    Err(GovernanceError::MalformedEvent { reason, .. }) => {
                        warn!("Skipping proposal log: {}", reason)
                    }
                    Err(e) => error!("Auto-execute failed: {}", e),
                }
            }
            debug!("Auto-executor stream closed");
        });

        AutoExecuteHandle { task }
    }
}

/// Background auto-executor; dropping it stops the subscription
pub struct AutoExecuteHandle {
    task: JoinHandle<()>,
}

impl AutoExecuteHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AutoExecuteHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
