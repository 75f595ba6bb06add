//! Write orchestration
//!
//! Every state-changing flow funnels through [`Submitter::submit`], which owns
//! the status transitions so the individual flows only build calls.

use std::sync::Arc;
use tracing::{debug, info, warn};

use lib_types::{ChainId, TxHash};

use crate::contract::{ContractCall, ContractClient};
use crate::error::{ClientError, Result};
use crate::gas::GasSettings;
use crate::notify::{Notification, NotificationSink};
use crate::retry::{retry_optional, RetryPolicy};
use crate::status::TxStatusStore;
use crate::wallet::WalletContext;

/// Simulate `call`, then attach a gas limit
///
/// A custom limit from `gas` skips estimation entirely.
pub async fn prepare_call(
    client: &dyn ContractClient,
    call: ContractCall,
    gas: &GasSettings,
) -> Result<ContractCall> {
    client.simulate(&call).await?;

    let limit = match gas.custom_gas_limit {
        Some(custom) => custom,
        None => gas.limit_for(client.estimate_gas(&call).await?),
    };
    debug!("Prepared call to {} with gas limit {}", call.to, limit);
    Ok(call.with_gas(limit))
}

/// Drives writes through a [`TxStatusStore`]
#[derive(Clone)]
pub struct Submitter {
    client: Arc<dyn ContractClient>,
    notifier: Arc<dyn NotificationSink>,
    retry: RetryPolicy,
}

impl Submitter {
    pub fn new(client: Arc<dyn ContractClient>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            client,
            notifier,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &Arc<dyn ContractClient> {
        &self.client
    }

    /// Submit `call` and wait for it to be mined
    ///
    /// Failures are recorded in `status` and also returned. Wallet rejection
    /// resets `status` to `Initial` instead of `Error`.
    pub async fn submit(
        &self,
        status: &TxStatusStore,
        gas: &GasSettings,
        wallet: &WalletContext,
        label: &str,
        call: ContractCall,
    ) -> Result<TxHash> {
        let (account, chain_id) = match wallet.require_account().and_then(|a| {
            wallet.require_chain().map(|c| (a, c))
        }) {
            Ok(ctx) => ctx,
            Err(e) => {
                if !status.is_busy() {
                    status.fail(e.to_string());
                }
                return Err(e);
            }
        };

        status.begin()?;
        info!("{}: requesting signature from {}", label, account);

        let call = call.with_from(account);
        let prepared = match prepare_call(self.client.as_ref(), call, gas).await {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!("{}: preparation failed: {}", label, e);
                status.fail(e.to_string());
                return Err(e);
            }
        };

        let hash = match self.client.write(&prepared).await {
            Ok(hash) => hash,
            Err(ClientError::UserRejected) => {
                info!("{}: rejected in wallet", label);
                status.reset();
                return Err(ClientError::UserRejected);
            }
            Err(e) => {
                warn!("{}: submission failed: {}", label, e);
                status.fail(e.to_string());
                return Err(e);
            }
        };

        status.submitted(hash)?;
        info!("{}: broadcast {}", label, hash);

        let receipt = match self.client.wait_for_receipt(hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("{}: waiting for {} failed: {}", label, hash.short(), e);
                status.fail(e.to_string());
                return Err(e);
            }
        };

        if !receipt.success {
            let err = ClientError::TxFailed(hash);
            warn!("{}: {}", label, err);
            status.fail(err.to_string());
            return Err(err);
        }

        status.confirmed()?;
        info!("{}: confirmed in block {}", label, receipt.block_number);

        self.notify_success(label, chain_id, hash).await;
        Ok(hash)
    }

    /// Best-effort nonce lookup followed by the success notification
    ///
    /// Flows that drive their own status machine call this after confirmation.
    pub async fn notify_success(&self, label: &str, chain_id: ChainId, hash: TxHash) {
        let client = self.client.clone();
        let nonce = retry_optional(&self.retry, || {
            let client = client.clone();
            async move { client.transaction_nonce(hash).await }
        })
        .await;

        self.notifier.notify(Notification {
            action: label.to_string(),
            chain_id,
            hash,
            nonce,
        });
    }
}
