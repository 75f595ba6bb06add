//! Wallet connection context
//!
//! The wallet is an external collaborator; the client only needs to know who is
//! connected and on which chain. Signing happens inside [`ContractClient::write`].
//!
//! [`ContractClient::write`]: crate::contract::ContractClient::write

use serde::{Deserialize, Serialize};

use lib_types::{Address, ChainId};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletContext {
    pub account: Option<Address>,
    pub chain_id: Option<ChainId>,
}

impl WalletContext {
    pub fn connected(account: Address, chain_id: ChainId) -> Self {
        Self {
            account: Some(account),
            chain_id: Some(chain_id),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some() && self.chain_id.is_some()
    }

    pub fn require_account(&self) -> Result<Address> {
        self.account.ok_or(ClientError::MissingContext("wallet account"))
    }

    pub fn require_chain(&self) -> Result<ChainId> {
        self.chain_id.ok_or(ClientError::MissingContext("chain id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_wallet_reports_missing_account() {
        let wallet = WalletContext::disconnected();
        assert!(!wallet.is_connected());
        assert!(matches!(
            wallet.require_account(),
            Err(ClientError::MissingContext("wallet account"))
        ));
    }

    #[test]
    fn test_connected_wallet() {
        let wallet = WalletContext::connected(Address::repeat_byte(1), 1);
        assert!(wallet.is_connected());
        assert_eq!(wallet.require_chain().unwrap(), 1);
    }
}
