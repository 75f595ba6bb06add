//! Allowance revocation

use tracing::info;

use lib_client::allowance::revoke_call;
use lib_client::gas::REVOKE_GAS;
use lib_client::{estimate_gas_limit, GasSettings, Submitter, TxStatusStore, WalletContext};
use lib_types::{Address, Gas, TxHash};

use crate::errors::PositionResult;

/// `approve(spender, 0)` on `token`
pub async fn revoke(
    submitter: &Submitter,
    status: &TxStatusStore,
    gas: &GasSettings,
    wallet: &WalletContext,
    token: Address,
    spender: Address,
) -> PositionResult<TxHash> {
    info!("Revoking {} allowance for {}", token, spender);
    let hash = submitter
        .submit(
            status,
            gas,
            wallet,
            &format!("Revoke {} allowance", token),
            revoke_call(token, spender),
        )
        .await?;
    Ok(hash)
}

pub async fn estimate_revoke_gas(
    submitter: &Submitter,
    gas: &GasSettings,
    wallet: &WalletContext,
    token: Address,
    spender: Address,
) -> Gas {
    let call = wallet
        .account
        .map(|account| revoke_call(token, spender).with_from(account));
    estimate_gas_limit(
        Some(submitter.client().as_ref()),
        call.as_ref(),
        gas,
        REVOKE_GAS,
    )
    .await
}
