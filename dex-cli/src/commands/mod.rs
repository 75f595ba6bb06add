//! Command handlers
//!
//! Parsing and view-building helpers are pure and tested here; the handlers
//! in the submodules do the I/O.

pub mod exchange;
pub mod multisig;
pub mod position;

use std::str::FromStr;
use std::sync::Arc;

use lib_client::{
    ContractClient, GasSettingsStore, JsonRpcClient, Submitter, TracingSink, WalletContext,
};
use lib_types::{Address, Bytes, TokenStandard, U256};

use crate::cli_config::Settings;
use crate::error::{CliError, CliResult};

pub fn parse_address(raw: &str) -> CliResult<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| CliError::InvalidArgument(format!("'{}' is not an address: {}", raw, e)))
}

/// Decimal or 0x-prefixed hex
pub fn parse_u256(raw: &str) -> CliResult<U256> {
    U256::from_str(raw.trim())
        .map_err(|e| CliError::InvalidArgument(format!("'{}' is not an integer: {}", raw, e)))
}

pub fn parse_bytes(raw: &str) -> CliResult<Bytes> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| CliError::InvalidArgument(format!("'{}' is not hex calldata: {}", raw, e)))
}

pub fn parse_standard(raw: &str) -> CliResult<TokenStandard> {
    match raw.trim().to_ascii_lowercase().replace('-', "").as_str() {
        "erc20" | "a" => Ok(TokenStandard::Erc20),
        "erc223" | "b" => Ok(TokenStandard::Erc223),
        other => Err(CliError::InvalidArgument(format!(
            "unknown token standard '{}', expected erc20 or erc223",
            other
        ))),
    }
}

/// Unix timestamp `minutes` from now
pub fn deadline_from_now(minutes: u64) -> u64 {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    now.saturating_add(minutes.saturating_mul(60))
}

/// Shared collaborators for one invocation
pub struct Context {
    pub client: Arc<dyn ContractClient>,
    pub submitter: Submitter,
    pub wallet: WalletContext,
    pub gas: Arc<GasSettingsStore>,
}

impl Context {
    pub fn new(settings: &Settings) -> Self {
        let client: Arc<dyn ContractClient> = Arc::new(JsonRpcClient::new(settings.rpc.clone()));
        Self::with_client(settings, client)
    }

    pub fn with_client(settings: &Settings, client: Arc<dyn ContractClient>) -> Self {
        let submitter = Submitter::new(client.clone(), Arc::new(TracingSink));
        Self {
            client,
            submitter,
            wallet: WalletContext {
                account: settings.account,
                chain_id: settings.chain_id,
            },
            gas: Arc::new(GasSettingsStore::new(settings.gas)),
        }
    }
}
