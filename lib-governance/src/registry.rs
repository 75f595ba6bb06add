//! Token lookup for display
//!
//! Resolution order: curated registry (indexed under every address a token
//! has) → cache of tokens fetched from chain → placeholder.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use lib_client::abi::IERC20;
use lib_client::{read_call, ContractClient};
use lib_types::{Address, TokenInfo, DEFAULT_DECIMALS, PLACEHOLDER_SYMBOL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenSource {
    Registry,
    Cache,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedToken {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub source: TokenSource,
}

impl ResolvedToken {
    pub fn placeholder(address: Address) -> Self {
        Self {
            address,
            symbol: PLACEHOLDER_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            source: TokenSource::Placeholder,
        }
    }

    fn from_info(address: Address, info: &TokenInfo, source: TokenSource) -> Self {
        Self {
            address,
            symbol: info.symbol.clone(),
            decimals: info.decimals,
            source,
        }
    }
}

/// Curated token list
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    by_address: HashMap<Address, TokenInfo>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = TokenInfo>) -> Self {
        let mut by_address = HashMap::new();
        for token in tokens {
            for address in token.addresses() {
                by_address.insert(address, token.clone());
            }
        }
        Self { by_address }
    }

    /// Lookup under either standard's address
    pub fn get(&self, address: &Address) -> Option<&TokenInfo> {
        self.by_address.get(address)
    }

    pub fn is_empty(&self) -> bool {
        self.by_address.is_empty()
    }
}

/// Tokens discovered on chain, keyed by the address they were seen under
#[derive(Debug, Default)]
pub struct UnknownTokenCache {
    tokens: RwLock<HashMap<Address, TokenInfo>>,
}

impl UnknownTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<TokenInfo> {
        self.tokens.read().get(address).cloned()
    }

    pub fn insert(&self, token: TokenInfo) {
        self.tokens.write().insert(token.address, token);
    }

    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

/// Resolve without touching the network
pub fn resolve_token(
    registry: &TokenRegistry,
    cache: &UnknownTokenCache,
    address: Address,
) -> ResolvedToken {
    if let Some(info) = registry.get(&address) {
        return ResolvedToken::from_info(address, info, TokenSource::Registry);
    }
    if let Some(info) = cache.get(&address) {
        return ResolvedToken::from_info(address, &info, TokenSource::Cache);
    }
    ResolvedToken::placeholder(address)
}

/// Resolve, reading `symbol()`/`decimals()` from chain for unknown tokens
///
/// Successful fetches are cached. Failures degrade to the placeholder.
pub async fn resolve_or_fetch(
    client: &dyn ContractClient,
    registry: &TokenRegistry,
    cache: &UnknownTokenCache,
    address: Address,
) -> ResolvedToken {
    let resolved = resolve_token(registry, cache, address);
    if resolved.source != TokenSource::Placeholder {
        return resolved;
    }

    let fetched = tokio::try_join!(
        read_call(client, address, &IERC20::symbolCall {}),
        read_call(client, address, &IERC20::decimalsCall {}),
    );
    match fetched {
        Ok((symbol, decimals)) => {
            let info = TokenInfo::new(address, symbol._0, decimals._0);
            debug!("Cached unknown token {} ({})", info.symbol, address);
            cache.insert(info.clone());
            ResolvedToken::from_info(address, &info, TokenSource::Cache)
        }
        Err(e) => {
            warn!("Token metadata for {} unavailable: {}", address, e);
            resolved
        }
    }
}
