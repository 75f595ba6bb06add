//! Partial or full liquidity withdrawal
//!
//! `decreaseLiquidity` only credits the position; the tokens leave through the
//! same collect composite used for fees, bundled in one multicall.

use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use lib_client::gas::REMOVE_LIQUIDITY_GAS;
use lib_client::{
    estimate_gas_limit, ContractCall, GasSettingsStore, Submitter, TxStatusStore, WalletContext,
};
use lib_types::{Address, Bytes, Gas, TokenStandard, TxHash, U256};

use crate::abi::INonfungiblePositionManager::{self, DecreaseLiquidityParams};
use crate::collect::{build_collect_calls, encode_multicall, CollectRequest};
use crate::errors::{PositionError, PositionResult};
use crate::fees::{simulate_fees, FeesOwed};
use crate::position::Position;

const BPS: u64 = 10_000;

/// Share of `liquidity` for a percentage in `1..=100`
pub fn liquidity_to_remove(liquidity: u128, percent: u8) -> PositionResult<u128> {
    if !(1..=100).contains(&percent) {
        return Err(PositionError::InvalidPercentage(percent));
    }
    let share = U256::from(liquidity) * U256::from(percent) / U256::from(100u64);
    Ok(share.to::<u128>())
}

fn apply_slippage(amount: U256, slippage_bps: u16) -> U256 {
    let keep = BPS.saturating_sub(u64::from(slippage_bps));
    amount * U256::from(keep) / U256::from(BPS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOptions {
    pub percent: u8,
    /// Tolerated shortfall in basis points
    pub slippage_bps: u16,
    /// Unix timestamp after which the call reverts
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRequest {
    pub liquidity: u128,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: U256,
    pub collect: CollectRequest,
}

/// `decreaseLiquidity` followed by the collect composite
pub fn build_remove_calls(req: &RemoveRequest) -> Vec<Bytes> {
    let decrease = INonfungiblePositionManager::decreaseLiquidityCall {
        params: DecreaseLiquidityParams {
            tokenId: req.collect.token_id,
            liquidity: req.liquidity,
            amount0Min: req.amount0_min,
            amount1Min: req.amount1_min,
            deadline: req.deadline,
        },
    };
    let mut calls = vec![Bytes::from(decrease.abi_encode())];
    calls.extend(build_collect_calls(&req.collect));
    calls
}

pub struct LiquidityRemover {
    position_manager: Address,
    wrapped_native: Option<Address>,
    submitter: Submitter,
    status: Arc<TxStatusStore>,
    gas: Arc<GasSettingsStore>,
}

impl LiquidityRemover {
    pub fn new(
        position_manager: Address,
        wrapped_native: Option<Address>,
        submitter: Submitter,
        status: Arc<TxStatusStore>,
        gas: Arc<GasSettingsStore>,
    ) -> Self {
        Self {
            position_manager,
            wrapped_native,
            submitter,
            status,
            gas,
        }
    }

    pub fn status(&self) -> &Arc<TxStatusStore> {
        &self.status
    }

    /// Build the request; fees are best-effort and count as zero when unknown
    pub async fn request(
        &self,
        position: &Position,
        recipient: Address,
        standards: (TokenStandard, TokenStandard),
        options: &RemoveOptions,
    ) -> PositionResult<RemoveRequest> {
        if position.removed() {
            return Err(PositionError::NoLiquidity);
        }
        let liquidity = liquidity_to_remove(position.liquidity, options.percent)?;

        let (amount0, amount1) = match position.amounts() {
            Ok((a0, a1)) => (
                a0 * U256::from(options.percent) / U256::from(100u64),
                a1 * U256::from(options.percent) / U256::from(100u64),
            ),
            Err(e) => {
                warn!("Position {} amounts unknown, no minimum: {}", position.token_id, e);
                (U256::ZERO, U256::ZERO)
            }
        };
        let amount0_min = apply_slippage(amount0, options.slippage_bps);
        let amount1_min = apply_slippage(amount1, options.slippage_bps);

        let client = self.submitter.client().as_ref();
        let fees = simulate_fees(client, self.position_manager, position.token_id, recipient)
            .await
            .unwrap_or_else(|e| {
                warn!("Fee simulation for position {} failed: {}", position.token_id, e);
                FeesOwed::default()
            });
        let expected = FeesOwed {
            fees0: fees.fees0 + amount0_min,
            fees1: fees.fees1 + amount1_min,
        };

        Ok(RemoveRequest {
            liquidity,
            amount0_min,
            amount1_min,
            deadline: U256::from(options.deadline),
            collect: CollectRequest::for_position(
                position,
                recipient,
                standards,
                self.wrapped_native,
                expected,
            ),
        })
    }

    pub fn remove_call(&self, req: &RemoveRequest) -> ContractCall {
        encode_multicall(self.position_manager, build_remove_calls(req))
    }

    pub async fn estimate_gas(
        &self,
        position: &Position,
        wallet: &WalletContext,
        standards: (TokenStandard, TokenStandard),
        options: &RemoveOptions,
    ) -> Gas {
        let call = match wallet.account {
            Some(account) => self
                .request(position, account, standards, options)
                .await
                .ok()
                .map(|req| self.remove_call(&req).with_from(account)),
            None => None,
        };
        estimate_gas_limit(
            Some(self.submitter.client().as_ref()),
            call.as_ref(),
            &self.gas.get(),
            REMOVE_LIQUIDITY_GAS,
        )
        .await
    }

    pub async fn remove(
        &self,
        position: &Position,
        wallet: &WalletContext,
        standards: (TokenStandard, TokenStandard),
        options: &RemoveOptions,
    ) -> PositionResult<TxHash> {
        let prepared = match wallet.require_account() {
            Ok(account) => self.request(position, account, standards, options).await,
            Err(e) => Err(e.into()),
        };
        let req = match prepared {
            Ok(req) => req,
            Err(e) => {
                if !self.status.is_busy() {
                    self.status.fail(e.to_string());
                }
                return Err(e);
            }
        };

        info!(
            "Removing {}% ({}) of position {}",
            options.percent, req.liquidity, position.token_id
        );
        let hash = self
            .submitter
            .submit(
                &self.status,
                &self.gas.get(),
                wallet,
                &format!("Remove {}% liquidity from position #{}", options.percent, position.token_id),
                self.remove_call(&req),
            )
            .await?;
        Ok(hash)
    }
}
