//! Minting a new position
//!
//! Two phases share one status: first each token is made available to the
//! position manager (approve for ERC-20, deposit for ERC-223), then `mint` is
//! sent. The approval writes also run through their own [`TxStatusStore`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use lib_client::gas::MINT_GAS;
use lib_client::{
    allowance, estimate_gas_limit, prepare_call, ClientError, ContractCall, GasSettingsStore,
    Submitter, TxStatusStore, WalletContext,
};
use lib_types::{Address, Gas, TokenInfo, TokenStandard, TxHash, U256};

use crate::abi::INonfungiblePositionManager::{self, MintParams};
use crate::errors::{PositionError, PositionResult};
use crate::position::{fee_to_abi, tick_to_abi};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddLiquidityStatus {
    #[default]
    Initial,
    ApproveLoading,
    ApproveError,
    /// Allowances in place, mint not yet requested
    Mint,
    MintPending,
    MintLoading,
    MintError,
    Success,
}

impl AddLiquidityStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            AddLiquidityStatus::ApproveLoading
                | AddLiquidityStatus::Mint
                | AddLiquidityStatus::MintPending
                | AddLiquidityStatus::MintLoading
        )
    }
}

impl fmt::Display for AddLiquidityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddLiquidityStatus::Initial => "INITIAL",
            AddLiquidityStatus::ApproveLoading => "APPROVE_LOADING",
            AddLiquidityStatus::ApproveError => "APPROVE_ERROR",
            AddLiquidityStatus::Mint => "MINT",
            AddLiquidityStatus::MintPending => "MINT_PENDING",
            AddLiquidityStatus::MintLoading => "MINT_LOADING",
            AddLiquidityStatus::MintError => "MINT_ERROR",
            AddLiquidityStatus::Success => "SUCCESS",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquiditySnapshot {
    pub status: AddLiquidityStatus,
    pub hash: Option<TxHash>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct AddLiquidityStore {
    inner: Mutex<AddLiquiditySnapshot>,
}

impl AddLiquidityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AddLiquiditySnapshot {
        self.inner.lock().clone()
    }

    pub fn status(&self) -> AddLiquidityStatus {
        self.inner.lock().status
    }

    /// Enter `ApproveLoading`, refusing while a run is in flight
    pub fn begin(&self) -> PositionResult<()> {
        let mut inner = self.inner.lock();
        if inner.status.is_in_flight() {
            return Err(PositionError::InFlight(inner.status));
        }
        *inner = AddLiquiditySnapshot {
            status: AddLiquidityStatus::ApproveLoading,
            ..Default::default()
        };
        Ok(())
    }

    pub fn set(&self, status: AddLiquidityStatus) {
        let mut inner = self.inner.lock();
        if status == AddLiquidityStatus::Initial {
            *inner = AddLiquiditySnapshot::default();
        } else {
            inner.status = status;
        }
    }

    /// Mint broadcast
    pub fn submitted(&self, hash: TxHash) {
        let mut inner = self.inner.lock();
        inner.status = AddLiquidityStatus::MintLoading;
        inner.hash = Some(hash);
    }

    pub fn fail(&self, status: AddLiquidityStatus, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        inner.status = status;
        inner.error = Some(message.into());
    }

    pub fn reset(&self) {
        self.set(AddLiquidityStatus::Initial);
    }
}

/// Parameters of a new position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub standard0: TokenStandard,
    pub standard1: TokenStandard,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: u64,
}

pub fn mint_call(position_manager: Address, req: &MintRequest) -> PositionResult<ContractCall> {
    let params = MintParams {
        token0: req.token0.address,
        token1: req.token1.address,
        fee: fee_to_abi(req.fee)?,
        tickLower: tick_to_abi(req.tick_lower)?,
        tickUpper: tick_to_abi(req.tick_upper)?,
        amount0Desired: req.amount0_desired,
        amount1Desired: req.amount1_desired,
        amount0Min: req.amount0_min,
        amount1Min: req.amount1_min,
        recipient: req.recipient,
        deadline: U256::from(req.deadline),
    };
    Ok(ContractCall::encode(
        position_manager,
        &INonfungiblePositionManager::mintCall { params },
    ))
}

fn funding_address(token: &TokenInfo, standard: TokenStandard) -> PositionResult<Address> {
    token
        .address_for(standard)
        .ok_or_else(|| PositionError::UnsupportedStandard {
            symbol: token.symbol.clone(),
            standard,
        })
}

pub struct LiquidityProvider {
    position_manager: Address,
    submitter: Submitter,
    status: Arc<AddLiquidityStore>,
    approve_status: Arc<TxStatusStore>,
    gas: Arc<GasSettingsStore>,
}

impl LiquidityProvider {
    pub fn new(
        position_manager: Address,
        submitter: Submitter,
        status: Arc<AddLiquidityStore>,
        approve_status: Arc<TxStatusStore>,
        gas: Arc<GasSettingsStore>,
    ) -> Self {
        Self {
            position_manager,
            submitter,
            status,
            approve_status,
            gas,
        }
    }

    pub fn status(&self) -> &Arc<AddLiquidityStore> {
        &self.status
    }

    pub async fn estimate_mint_gas(&self, req: &MintRequest, wallet: &WalletContext) -> Gas {
        let call = match (wallet.account, mint_call(self.position_manager, req)) {
            (Some(account), Ok(call)) => Some(call.with_from(account)),
            _ => None,
        };
        estimate_gas_limit(
            Some(self.submitter.client().as_ref()),
            call.as_ref(),
            &self.gas.get(),
            MINT_GAS,
        )
        .await
    }

    /// Fund both sides, then mint; returns the mint hash
    pub async fn add_liquidity(
        &self,
        req: &MintRequest,
        wallet: &WalletContext,
    ) -> PositionResult<TxHash> {
        let context = wallet
            .require_account()
            .and_then(|account| wallet.require_chain().map(|chain| (account, chain)));
        let (account, chain_id) = match context {
            Ok(context) => context,
            Err(e) => {
                if !self.status.status().is_in_flight() {
                    self.status.fail(AddLiquidityStatus::ApproveError, e.to_string());
                }
                return Err(e.into());
            }
        };

        self.status.begin()?;
        if let Err(e) = self.fund(req, wallet).await {
            warn!("Funding failed: {}", e);
            self.status.fail(AddLiquidityStatus::ApproveError, e.to_string());
            return Err(e);
        }
        self.status.set(AddLiquidityStatus::Mint);

        let label = format!("Add {}/{} liquidity", req.token0.symbol, req.token1.symbol);
        let client = self.submitter.client();

        let prepared = match mint_call(self.position_manager, req) {
            Ok(call) => prepare_call(client.as_ref(), call.with_from(account), &self.gas.get())
                .await
                .map_err(PositionError::from),
            Err(e) => Err(e),
        };
        let call = match prepared {
            Ok(call) => call,
            Err(e) => {
                self.status.fail(AddLiquidityStatus::MintError, e.to_string());
                return Err(e);
            }
        };

        self.status.set(AddLiquidityStatus::MintPending);
        let hash = match client.write(&call).await {
            Ok(hash) => hash,
            Err(ClientError::UserRejected) => {
                info!("{}: rejected in wallet", label);
                self.status.reset();
                return Err(ClientError::UserRejected.into());
            }
            Err(e) => {
                self.status.fail(AddLiquidityStatus::MintError, e.to_string());
                return Err(e.into());
            }
        };
        self.status.submitted(hash);
        info!("{}: broadcast {}", label, hash);

        let receipt = match client.wait_for_receipt(hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.status.fail(AddLiquidityStatus::MintError, e.to_string());
                return Err(e.into());
            }
        };
        if !receipt.success {
            let err = ClientError::TxFailed(hash);
            self.status.fail(AddLiquidityStatus::MintError, err.to_string());
            return Err(err.into());
        }

        self.status.set(AddLiquidityStatus::Success);
        info!("{}: confirmed in block {}", label, receipt.block_number);
        self.submitter.notify_success(&label, chain_id, hash).await;
        Ok(hash)
    }

    async fn fund(&self, req: &MintRequest, wallet: &WalletContext) -> PositionResult<()> {
        let sides = [
            (&req.token0, req.standard0, req.amount0_desired),
            (&req.token1, req.standard1, req.amount1_desired),
        ];
        for (token, standard, amount) in sides {
            if amount == U256::ZERO {
                continue;
            }
            let address = funding_address(token, standard)?;
            allowance::ensure_allowance(
                &self.submitter,
                &self.approve_status,
                &self.gas.get(),
                wallet,
                standard,
                address,
                self.position_manager,
                amount,
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_guards_in_flight() {
        let store = AddLiquidityStore::new();
        store.begin().unwrap();
        assert!(matches!(
            store.begin(),
            Err(PositionError::InFlight(AddLiquidityStatus::ApproveLoading))
        ));

        store.fail(AddLiquidityStatus::ApproveError, "denied");
        // terminal states may start over
        store.begin().unwrap();
        assert_eq!(store.snapshot().error, None);
    }

    #[test]
    fn test_reset_clears_hash() {
        let store = AddLiquidityStore::new();
        store.submitted(TxHash::new([3; 32]));
        assert_eq!(store.status(), AddLiquidityStatus::MintLoading);
        store.reset();
        assert_eq!(store.snapshot(), AddLiquiditySnapshot::default());
    }

    #[test]
    fn test_status_names() {
        assert_eq!(AddLiquidityStatus::MintPending.to_string(), "MINT_PENDING");
        assert_eq!(
            serde_json::to_string(&AddLiquidityStatus::ApproveError).unwrap(),
            "\"APPROVE_ERROR\""
        );
    }
}
