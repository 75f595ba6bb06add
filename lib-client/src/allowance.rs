//! Spending permission for both token standards
//!
//! ERC-20 tokens are spent through `approve`/`allowance`. ERC-223 tokens have
//! no allowance; they are transferred into the spender ahead of time and the
//! spender keeps a per-user deposit balance.

use tracing::{debug, info};

use lib_types::{Address, TokenStandard, TxHash, U256};

use crate::abi::{IERC20, IERC223Depository};
use crate::contract::{read_call, ContractCall, ContractClient};
use crate::error::Result;
use crate::gas::GasSettings;
use crate::status::TxStatusStore;
use crate::submit::Submitter;
use crate::wallet::WalletContext;

pub async fn current_allowance(
    client: &dyn ContractClient,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256> {
    let ret = read_call(client, token, &IERC20::allowanceCall { owner, spender }).await?;
    Ok(ret._0)
}

/// ERC-223 balance `owner` has already deposited into `spender`
pub async fn deposited_amount(
    client: &dyn ContractClient,
    spender: Address,
    owner: Address,
    token: Address,
) -> Result<U256> {
    let ret = read_call(
        client,
        spender,
        &IERC223Depository::depositedTokensCall { user: owner, token },
    )
    .await?;
    Ok(ret._0)
}

/// Amount already available to `spender` under the given standard
pub async fn available_amount(
    client: &dyn ContractClient,
    standard: TokenStandard,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256> {
    match standard {
        TokenStandard::Erc20 => current_allowance(client, token, owner, spender).await,
        TokenStandard::Erc223 => deposited_amount(client, spender, owner, token).await,
    }
}

pub fn approve_call(token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::encode(token, &IERC20::approveCall { spender, amount })
}

/// ERC-223 deposit: a plain transfer into the spender
pub fn deposit_call(token: Address, spender: Address, amount: U256) -> ContractCall {
    ContractCall::encode(token, &IERC20::transferCall { to: spender, amount })
}

pub fn revoke_call(token: Address, spender: Address) -> ContractCall {
    approve_call(token, spender, U256::ZERO)
}

/// Call that tops `spender` up to `amount`, or `None` if it already has enough
pub fn top_up_call(
    standard: TokenStandard,
    token: Address,
    spender: Address,
    amount: U256,
    available: U256,
) -> Option<ContractCall> {
    if available >= amount {
        return None;
    }
    Some(match standard {
        TokenStandard::Erc20 => approve_call(token, spender, amount),
        TokenStandard::Erc223 => deposit_call(token, spender, amount - available),
    })
}

/// Approve or deposit so that `spender` can pull `amount` of `token`
///
/// Returns the hash of the write, or `None` when nothing had to be sent.
#[allow(clippy::too_many_arguments)]
pub async fn ensure_allowance(
    submitter: &Submitter,
    status: &TxStatusStore,
    gas: &GasSettings,
    wallet: &WalletContext,
    standard: TokenStandard,
    token: Address,
    spender: Address,
    amount: U256,
) -> Result<Option<TxHash>> {
    let owner = wallet.require_account()?;
    let available =
        available_amount(submitter.client().as_ref(), standard, token, owner, spender).await?;

    let Some(call) = top_up_call(standard, token, spender, amount, available) else {
        debug!("{} {} already covers {}", standard, token, amount);
        return Ok(None);
    };

    let label = match standard {
        TokenStandard::Erc20 => format!("Approve {}", token),
        TokenStandard::Erc223 => format!("Deposit {}", token),
    };
    info!("{}: {} available, {} required", label, available, amount);
    submitter.submit(status, gas, wallet, &label, call).await.map(Some)
}
