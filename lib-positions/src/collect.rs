//! Fee collection routing
//!
//! When one side of the pool is the wrapped native token the position manager
//! collects to itself (`recipient = 0x0`), unwraps the native side and sweeps
//! the other token out. The steps are bundled into one `multicall`.

use alloy_sol_types::SolCall;
use std::sync::Arc;
use tracing::{info, warn};

use lib_client::gas::COLLECT_FEES_GAS;
use lib_client::{
    estimate_gas_limit, ContractCall, GasSettingsStore, Submitter, TxStatusStore, WalletContext,
};
use lib_types::{Address, Bytes, Gas, TokenInfo, TokenStandard, TxHash, U256};

use crate::abi::INonfungiblePositionManager;
use crate::errors::PositionResult;
use crate::fees::{max_collect_params, simulate_fees, FeesOwed};
use crate::position::Position;

/// Which standard each side of a collect is paid out in
pub fn tokens_out_code(standard0: TokenStandard, standard1: TokenStandard) -> u8 {
    match (standard0, standard1) {
        (TokenStandard::Erc20, TokenStandard::Erc20) => 0,
        (TokenStandard::Erc20, TokenStandard::Erc223) => 1,
        (TokenStandard::Erc223, TokenStandard::Erc20) => 2,
        (TokenStandard::Erc223, TokenStandard::Erc223) => 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Token0,
    Token1,
}

/// Everything needed to encode a collect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectRequest {
    pub token_id: U256,
    pub recipient: Address,
    pub token0: TokenInfo,
    pub token1: TokenInfo,
    pub standard0: TokenStandard,
    pub standard1: TokenStandard,
    /// Side holding the wrapped native token, if any
    pub native_side: Option<Side>,
    /// Minimum amounts forwarded by unwrap/sweep
    pub expected: FeesOwed,
}

impl CollectRequest {
    pub fn for_position(
        position: &Position,
        recipient: Address,
        standards: (TokenStandard, TokenStandard),
        wrapped_native: Option<Address>,
        expected: FeesOwed,
    ) -> Self {
        let pool = &position.pool;
        let native_side = wrapped_native.and_then(|weth| {
            if pool.token0.address == weth {
                Some(Side::Token0)
            } else if pool.token1.address == weth {
                Some(Side::Token1)
            } else {
                None
            }
        });

        // the native side must arrive as ERC-20 to be unwrapped
        let (mut standard0, mut standard1) = standards;
        match native_side {
            Some(Side::Token0) => standard0 = TokenStandard::Erc20,
            Some(Side::Token1) => standard1 = TokenStandard::Erc20,
            None => {}
        }

        Self {
            token_id: position.token_id,
            recipient,
            token0: pool.token0.clone(),
            token1: pool.token1.clone(),
            standard0,
            standard1,
            native_side,
            expected,
        }
    }

    pub fn tokens_out_code(&self) -> u8 {
        tokens_out_code(self.standard0, self.standard1)
    }
}

fn payout_address(token: &TokenInfo, standard: TokenStandard) -> Address {
    token.address_for(standard).unwrap_or(token.address)
}

/// Ordered calldata for a collect, unwrapping the native side when present
pub fn build_collect_calls(req: &CollectRequest) -> Vec<Bytes> {
    let code = req.tokens_out_code();
    let Some(native_side) = req.native_side else {
        let collect = INonfungiblePositionManager::collectCall {
            params: max_collect_params(req.token_id, req.recipient, code),
        };
        return vec![collect.abi_encode().into()];
    };

    let (native_min, other, other_standard, other_min) = match native_side {
        Side::Token0 => (req.expected.fees0, &req.token1, req.standard1, req.expected.fees1),
        Side::Token1 => (req.expected.fees1, &req.token0, req.standard0, req.expected.fees0),
    };

    let collect = INonfungiblePositionManager::collectCall {
        params: max_collect_params(req.token_id, Address::ZERO, code),
    };
    let unwrap = INonfungiblePositionManager::unwrapWETH9Call {
        amountMinimum: native_min,
        recipient: req.recipient,
    };
    let sweep = INonfungiblePositionManager::sweepTokenCall {
        token: payout_address(other, other_standard),
        amountMinimum: other_min,
        recipient: req.recipient,
    };
    vec![
        collect.abi_encode().into(),
        unwrap.abi_encode().into(),
        sweep.abi_encode().into(),
    ]
}

/// A single call goes out as-is; several are wrapped in `multicall`
pub fn encode_multicall(position_manager: Address, mut calls: Vec<Bytes>) -> ContractCall {
    if calls.len() == 1 {
        if let Some(only) = calls.pop() {
            return ContractCall::new(position_manager, only);
        }
    }
    ContractCall::encode(
        position_manager,
        &INonfungiblePositionManager::multicallCall { data: calls },
    )
}

pub struct FeeCollector {
    position_manager: Address,
    wrapped_native: Option<Address>,
    submitter: Submitter,
    status: Arc<TxStatusStore>,
    gas: Arc<GasSettingsStore>,
}

impl FeeCollector {
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

    pub async fn fees(&self, position: &Position, owner: Address) -> PositionResult<FeesOwed> {
        simulate_fees(
            self.submitter.client().as_ref(),
            self.position_manager,
            position.token_id,
            owner,
        )
        .await
    }

    pub fn collect_call(
        &self,
        position: &Position,
        recipient: Address,
        standards: (TokenStandard, TokenStandard),
        expected: FeesOwed,
    ) -> ContractCall {
        let req = CollectRequest::for_position(position, recipient, standards, self.wrapped_native, expected);
        encode_multicall(self.position_manager, build_collect_calls(&req))
    }

    /// Gas preview; falls back to a fixed limit
    pub async fn estimate_gas(
        &self,
        position: &Position,
        wallet: &WalletContext,
        standards: (TokenStandard, TokenStandard),
    ) -> Gas {
        let call = wallet.account.map(|account| {
            self.collect_call(position, account, standards, FeesOwed::default())
                .with_from(account)
        });
        estimate_gas_limit(
            Some(self.submitter.client().as_ref()),
            call.as_ref(),
            &self.gas.get(),
            COLLECT_FEES_GAS,
        )
        .await
    }

    /// Collect all owed fees to the connected account
    pub async fn collect_fees(
        &self,
        position: &Position,
        wallet: &WalletContext,
        standards: (TokenStandard, TokenStandard),
    ) -> PositionResult<TxHash> {
        let account = match wallet.require_account() {
            Ok(account) => account,
            Err(e) => {
                if !self.status.is_busy() {
                    self.status.fail(e.to_string());
                }
                return Err(e.into());
            }
        };

        let expected = match self.fees(position, account).await {
            Ok(fees) => fees,
            Err(e) => {
                warn!("Fee simulation for position {} failed: {}", position.token_id, e);
                if !self.status.is_busy() {
                    self.status.fail(e.to_string());
                }
                return Err(e);
            }
        };
        info!(
            "Collecting fees for position {}: {} / {}",
            position.token_id, expected.fees0, expected.fees1
        );

        let call = self.collect_call(position, account, standards, expected);
        let hash = self
            .submitter
            .submit(
                &self.status,
                &self.gas.get(),
                wallet,
                &format!("Collect fees for position #{}", position.token_id),
                call,
            )
            .await?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Pool;

    fn weth() -> Address {
        Address::repeat_byte(0xee)
    }

    fn position(token0: Address, token1: Address) -> Position {
        let pool = Pool::new(
            TokenInfo::new(token0, "T0", 18).with_erc223(Address::repeat_byte(0x10)),
            TokenInfo::new(token1, "T1", 6).with_erc223(Address::repeat_byte(0x11)),
            500,
        );
        Position::new(U256::from(42u64), pool, -10, 10, 1).unwrap()
    }

    fn fees() -> FeesOwed {
        FeesOwed {
            fees0: U256::from(5u64),
            fees1: U256::from(9u64),
        }
    }

    #[test]
    fn test_tokens_out_code_table() {
        use TokenStandard::*;
        assert_eq!(tokens_out_code(Erc20, Erc20), 0);
        assert_eq!(tokens_out_code(Erc20, Erc223), 1);
        assert_eq!(tokens_out_code(Erc223, Erc20), 2);
        assert_eq!(tokens_out_code(Erc223, Erc223), 3);
    }

    #[test]
    fn test_plain_pool_single_collect() {
        let recipient = Address::repeat_byte(0xaa);
        let req = CollectRequest::for_position(
            &position(Address::repeat_byte(1), Address::repeat_byte(2)),
            recipient,
            (TokenStandard::Erc20, TokenStandard::Erc223),
            Some(weth()),
            fees(),
        );
        assert_eq!(req.native_side, None);

        let calls = build_collect_calls(&req);
        assert_eq!(calls.len(), 1);
        let decoded = INonfungiblePositionManager::collectCall::abi_decode(&calls[0], true).unwrap();
        assert_eq!(decoded.params.recipient, recipient);
        assert_eq!(decoded.params.amount0Max, u128::MAX);
        assert_eq!(decoded.params.tokensOutCode, 1);

        let call = encode_multicall(Address::repeat_byte(0x99), calls.clone());
        assert_eq!(call.data, calls[0]);
    }

    #[test]
    fn test_native_pool_collect_unwrap_sweep() {
        let recipient = Address::repeat_byte(0xaa);
        let other = Address::repeat_byte(2);
        let req = CollectRequest::for_position(
            &position(weth(), other),
            recipient,
            (TokenStandard::Erc223, TokenStandard::Erc223),
            Some(weth()),
            fees(),
        );
        assert_eq!(req.native_side, Some(Side::Token0));
        // native side forced to ERC-20
        assert_eq!(req.tokens_out_code(), 1);

        let calls = build_collect_calls(&req);
        assert_eq!(calls.len(), 3);

        let collect = INonfungiblePositionManager::collectCall::abi_decode(&calls[0], true).unwrap();
        assert_eq!(collect.params.recipient, Address::ZERO);

        let unwrap = INonfungiblePositionManager::unwrapWETH9Call::abi_decode(&calls[1], true).unwrap();
        assert_eq!(unwrap.amountMinimum, U256::from(5u64));
        assert_eq!(unwrap.recipient, recipient);

        let sweep = INonfungiblePositionManager::sweepTokenCall::abi_decode(&calls[2], true).unwrap();
        // other side paid out as ERC-223
        assert_eq!(sweep.token, Address::repeat_byte(0x11));
        assert_eq!(sweep.amountMinimum, U256::from(9u64));
        assert_eq!(sweep.recipient, recipient);

        let call = encode_multicall(Address::repeat_byte(0x99), calls.clone());
        let multicall = INonfungiblePositionManager::multicallCall::abi_decode(&call.data, true).unwrap();
        assert_eq!(multicall.data, calls);
    }
}
