//! Uncollected fees
//!
//! The position manager only settles fees inside `collect`, so the owed amounts
//! are obtained by simulating a maximal collect from the owner's account.

use serde::{Deserialize, Serialize};

use lib_client::{simulate_call, ContractClient};
use lib_types::{format_units, Address, U256};

use crate::abi::INonfungiblePositionManager::{self, CollectParams};
use crate::errors::PositionResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesOwed {
    pub fees0: U256,
    pub fees1: U256,
}

impl FeesOwed {
    pub fn is_zero(&self) -> bool {
        self.fees0 == U256::ZERO && self.fees1 == U256::ZERO
    }

    pub fn formatted(&self, decimals0: u8, decimals1: u8) -> (String, String) {
        (
            format_units(self.fees0, decimals0),
            format_units(self.fees1, decimals1),
        )
    }
}

pub fn max_collect_params(token_id: U256, recipient: Address, tokens_out_code: u8) -> CollectParams {
    CollectParams {
        tokenId: token_id,
        recipient,
        amount0Max: u128::MAX,
        amount1Max: u128::MAX,
        tokensOutCode: tokens_out_code,
    }
}

pub async fn simulate_fees(
    client: &dyn ContractClient,
    position_manager: Address,
    token_id: U256,
    owner: Address,
) -> PositionResult<FeesOwed> {
    let ret = simulate_call(
        client,
        owner,
        position_manager,
        &INonfungiblePositionManager::collectCall {
            params: max_collect_params(token_id, owner, 0),
        },
    )
    .await?;
    Ok(FeesOwed {
        fees0: ret.amount0,
        fees1: ret.amount1,
    })
}
