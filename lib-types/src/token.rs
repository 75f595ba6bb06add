//! Token descriptors
//!
//! A token can be reachable under two interface standards at two different
//! addresses (an ERC-20 address and an ERC-223 address for the same asset).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::Address;

/// Symbol shown for a token whose metadata could not be read
pub const PLACEHOLDER_SYMBOL: &str = "Unknown Token";

/// Decimals assumed for a token whose metadata could not be read
pub const DEFAULT_DECIMALS: u8 = 18;

/// Token interface standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStandard {
    /// Standard A
    #[default]
    Erc20,
    /// Standard B
    Erc223,
}

impl TokenStandard {
    pub const ALL: [TokenStandard; 2] = [TokenStandard::Erc20, TokenStandard::Erc223];
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStandard::Erc20 => write!(f, "ERC-20"),
            TokenStandard::Erc223 => write!(f, "ERC-223"),
        }
    }
}

/// Curated token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Primary (ERC-20) address
    pub address: Address,
    /// Secondary (ERC-223) address, when the token has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_erc223: Option<Address>,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            address_erc223: None,
            symbol: symbol.into(),
            decimals,
            logo: None,
        }
    }

    /// Stand-in for a token with unreadable metadata
    pub fn placeholder(address: Address) -> Self {
        Self::new(address, PLACEHOLDER_SYMBOL, DEFAULT_DECIMALS)
    }

    pub fn with_erc223(mut self, address: Address) -> Self {
        self.address_erc223 = Some(address);
        self
    }

    /// Every address this token is reachable under
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        std::iter::once(self.address).chain(self.address_erc223)
    }

    /// Address for the requested standard, if the token supports it
    pub fn address_for(&self, standard: TokenStandard) -> Option<Address> {
        match standard {
            TokenStandard::Erc20 => Some(self.address),
            TokenStandard::Erc223 => self.address_erc223,
        }
    }
}
