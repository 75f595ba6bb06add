//! Multisig Transaction Records
//!
//! Transactions live in an append-only ledger on the multisig contract,
//! indexed `0..numTxs`. Only the `executed` flag and vote counters change
//! after proposal.

use serde::{Deserialize, Serialize};
use tracing::debug;

use lib_client::{read_call, ContractClient};
use lib_types::{Address, Bytes, Timestamp, U256};

use crate::abi::IMultisig;
use crate::errors::{GovernanceError, GovernanceResult};

/// Index into the multisig ledger
pub type MultisigTxId = u64;

/// On-chain transaction record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigTransaction {
    pub id: MultisigTxId,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub proposed_timestamp: Timestamp,
    pub executed: bool,
    pub num_approvals: U256,
    pub num_votes: U256,
    pub required_approvals: U256,
}

/// Contract-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigConfig {
    pub num_owners: U256,
    pub vote_pass_threshold: U256,
    /// Seconds between proposal and earliest execution
    pub execution_delay: u64,
    pub num_txs: u64,
}

pub(crate) fn to_u64(value: U256, field: &'static str) -> GovernanceResult<u64> {
    if value > U256::from(u64::MAX) {
        return Err(GovernanceError::ValueOverflow { field });
    }
    Ok(value.to::<u64>())
}

pub async fn fetch_config(
    client: &dyn ContractClient,
    multisig: Address,
) -> GovernanceResult<MultisigConfig> {
    let (owners, threshold, delay, count) = tokio::try_join!(
        read_call(client, multisig, &IMultisig::numOwnersCall {}),
        read_call(client, multisig, &IMultisig::votePassThresholdCall {}),
        read_call(client, multisig, &IMultisig::executionDelayCall {}),
        read_call(client, multisig, &IMultisig::numTxsCall {}),
    )?;

    Ok(MultisigConfig {
        num_owners: owners._0,
        vote_pass_threshold: threshold._0,
        execution_delay: to_u64(delay._0, "executionDelay")?,
        num_txs: to_u64(count._0, "numTxs")?,
    })
}

pub async fn fetch_vote_pass_threshold(
    client: &dyn ContractClient,
    multisig: Address,
) -> GovernanceResult<U256> {
    Ok(read_call(client, multisig, &IMultisig::votePassThresholdCall {}).await?._0)
}

pub async fn fetch_num_txs(client: &dyn ContractClient, multisig: Address) -> GovernanceResult<u64> {
    let ret = read_call(client, multisig, &IMultisig::numTxsCall {}).await?;
    to_u64(ret._0, "numTxs")
}

pub async fn fetch_transaction(
    client: &dyn ContractClient,
    multisig: Address,
    id: MultisigTxId,
) -> GovernanceResult<MultisigTransaction> {
    let ret = read_call(client, multisig, &IMultisig::getTxCall { txId: U256::from(id) }).await?;

    Ok(MultisigTransaction {
        id,
        to: ret.to,
        value: ret.value,
        data: ret.data,
        proposed_timestamp: to_u64(ret.proposedTimestamp, "proposedTimestamp")?,
        executed: ret.executed,
        num_approvals: ret.numApprovals,
        num_votes: ret.numVotes,
        required_approvals: ret.requiredApprovals,
    })
}

/// Every transaction, newest first
pub async fn fetch_transactions(
    client: &dyn ContractClient,
    multisig: Address,
) -> GovernanceResult<Vec<MultisigTransaction>> {
    let count = fetch_num_txs(client, multisig).await?;
    debug!("Loading {} multisig transactions from {}", count, multisig);

    let mut txs = Vec::new();
    for id in (0..count).rev() {
        txs.push(fetch_transaction(client, multisig, id).await?);
    }
    Ok(txs)
}

pub async fn is_owner(
    client: &dyn ContractClient,
    multisig: Address,
    account: Address,
) -> GovernanceResult<bool> {
    Ok(read_call(client, multisig, &IMultisig::isOwnerCall { account }).await?._0)
}

/// On-chain execution predicate; the contract may apply rules beyond vote counts
pub async fn tx_allowed(
    client: &dyn ContractClient,
    multisig: Address,
    id: MultisigTxId,
) -> GovernanceResult<bool> {
    Ok(read_call(client, multisig, &IMultisig::txAllowedCall { txId: U256::from(id) }).await?._0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64(U256::from(42u64), "x").unwrap(), 42);
        assert_eq!(to_u64(U256::from(u64::MAX), "x").unwrap(), u64::MAX);
        assert!(matches!(
            to_u64(U256::from(u64::MAX) + U256::from(1u64), "x"),
            Err(GovernanceError::ValueOverflow { field: "x" })
        ));
    }
}
