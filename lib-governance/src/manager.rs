//! Multisig lifecycle manager
//!
//! One entry point per concern: `handle_action` for writes, `load_display`
//! for reads. State containers are injected so several flows can share or
//! isolate them as needed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use lib_client::gas::MULTISIG_ACTION_GAS;
use lib_client::{
    estimate_gas_limit, ClientError, ContractClient, GasSettingsStore, Submitter, TxStatusStore,
    WalletContext,
};
use lib_types::{Address, Gas, TxHash};

use crate::action::MultisigAction;
use crate::display::{classify, derive_display, DisplayInputs, TransactionDisplayData, TxKind};
use crate::errors::{GovernanceError, GovernanceResult};
use crate::registry::{resolve_or_fetch, TokenRegistry, UnknownTokenCache};
use crate::tx::{self, MultisigConfig, MultisigTransaction, MultisigTxId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    pub multisig: Address,
    /// Symbol shown for native-coin transfers
    pub native_symbol: String,
    /// Gas limit used when estimation is impossible
    pub fallback_gas: Gas,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            multisig: Address::ZERO,
            native_symbol: "ETH".to_string(),
            fallback_gas: MULTISIG_ACTION_GAS,
        }
    }
}

impl ManagerConfig {
    pub fn new(multisig: Address) -> Self {
        Self {
            multisig,
            ..Self::default()
        }
    }
}

pub struct MultisigManager {
    config: ManagerConfig,
    submitter: Submitter,
    status: Arc<TxStatusStore>,
    gas: Arc<GasSettingsStore>,
    registry: Arc<TokenRegistry>,
    unknown_tokens: Arc<UnknownTokenCache>,
}

impl MultisigManager {
    pub fn new(
        config: ManagerConfig,
        submitter: Submitter,
        status: Arc<TxStatusStore>,
        gas: Arc<GasSettingsStore>,
        registry: Arc<TokenRegistry>,
        unknown_tokens: Arc<UnknownTokenCache>,
    ) -> Self {
        Self {
            config,
            submitter,
            status,
            gas,
            registry,
            unknown_tokens,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn status(&self) -> &Arc<TxStatusStore> {
        &self.status
    }

    fn client(&self) -> &dyn ContractClient {
        self.submitter.client().as_ref()
    }

    fn multisig(&self) -> GovernanceResult<Address> {
        if self.config.multisig == Address::ZERO {
            return Err(GovernanceError::MultisigNotConfigured);
        }
        Ok(self.config.multisig)
    }

    /// Submit the single on-chain write for `action`
    ///
    /// Drives the shared status store; failures are recorded there and
    /// returned.
    pub async fn handle_action(
        &self,
        action: &MultisigAction,
        wallet: &WalletContext,
    ) -> GovernanceResult<TxHash> {
        let multisig = match self.multisig() {
            Ok(address) => address,
            Err(e) => {
                if !self.status.is_busy() {
                    self.status.fail(e.to_string());
                }
                return Err(e);
            }
        };

        info!("Multisig action: {}", action);
        let call = action.outer_call(multisig);
        let hash = self
            .submitter
            .submit(&self.status, &self.gas.get(), wallet, &action.to_string(), call)
            .await?;
        Ok(hash)
    }

    /// Gas limit preview; never fails
    pub async fn estimate_action_gas(&self, action: &MultisigAction, wallet: &WalletContext) -> Gas {
        let call = match (self.multisig(), wallet.account) {
            (Ok(multisig), Some(account)) => Some(action.outer_call(multisig).with_from(account)),
            _ => None,
        };
        estimate_gas_limit(
            Some(self.client()),
            call.as_ref(),
            &self.gas.get(),
            self.config.fallback_gas,
        )
        .await
    }

    pub async fn fetch_config(&self) -> GovernanceResult<MultisigConfig> {
        tx::fetch_config(self.client(), self.multisig()?).await
    }

    pub async fn fetch_transaction(&self, id: MultisigTxId) -> GovernanceResult<MultisigTransaction> {
        let multisig = self.multisig()?;
        let count = tx::fetch_num_txs(self.client(), multisig).await?;
        if id >= count {
            return Err(GovernanceError::UnknownTransaction { id, num_txs: count });
        }
        tx::fetch_transaction(self.client(), multisig, id).await
    }

    pub async fn fetch_transactions(&self) -> GovernanceResult<Vec<MultisigTransaction>> {
        tx::fetch_transactions(self.client(), self.multisig()?).await
    }

    pub async fn is_owner(&self, account: Address) -> GovernanceResult<bool> {
        tx::is_owner(self.client(), self.multisig()?, account).await
    }

    pub async fn can_execute(&self, id: MultisigTxId) -> GovernanceResult<bool> {
        tx::tx_allowed(self.client(), self.multisig()?, id).await
    }

    pub async fn load_display(
        &self,
        id: MultisigTxId,
        wallet: &WalletContext,
    ) -> GovernanceResult<TransactionDisplayData> {
        let tx = self.fetch_transaction(id).await?;
        let config = self.config_or_warn().await;
        self.display_for(&tx, config.as_ref(), wallet).await
    }

    /// Every transaction, newest first
    pub async fn load_all_display(
        &self,
        wallet: &WalletContext,
    ) -> GovernanceResult<Vec<TransactionDisplayData>> {
        let txs = self.fetch_transactions().await?;
        let config = self.config_or_warn().await;
        let mut views = Vec::with_capacity(txs.len());
        for tx in &txs {
            views.push(self.display_for(tx, config.as_ref(), wallet).await?);
        }
        Ok(views)
    }

    async fn config_or_warn(&self) -> Option<MultisigConfig> {
        match self.fetch_config().await {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Multisig config unavailable, deadlines unknown: {}", e);
                None
            }
        }
    }

    async fn display_for(
        &self,
        tx: &MultisigTransaction,
        config: Option<&MultisigConfig>,
        wallet: &WalletContext,
    ) -> GovernanceResult<TransactionDisplayData> {
        let is_owner = match wallet.account {
            Some(account) => self.is_owner(account).await?,
            None => false,
        };
        let tx_allowed = match self.can_execute(tx.id).await {
            Ok(allowed) => allowed,
            // a reverting predicate means "not executable"
            Err(GovernanceError::Client(ClientError::Reverted(_))) => false,
            Err(e) => return Err(e),
        };

        let classified = classify(tx);
        let token = match (classified.kind, classified.token) {
            (TxKind::Token, Some(address)) => Some(
                resolve_or_fetch(self.client(), &self.registry, &self.unknown_tokens, address)
                    .await,
            ),
            _ => None,
        };

        Ok(derive_display(
            tx,
            DisplayInputs {
                config,
                token: token.as_ref(),
                native_symbol: &self.config.native_symbol,
                is_owner,
                tx_allowed,
            },
        ))
    }
}
