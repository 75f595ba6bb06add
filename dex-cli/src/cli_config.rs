//! CLI configuration loader and runtime settings
//!
//! Precedence: command-line flags and environment, then the selected profile,
//! then `[defaults]`, then built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use lib_client::{GasSettings, RpcConfig};
use lib_exchange::ExchangeConfig;
use lib_types::{Address, ChainId, Gas, TokenInfo};

use crate::error::{CliError, CliResult};

/// Default CLI config filename under ~/.dex/
pub const DEFAULT_CONFIG_FILENAME: &str = "cli.toml";

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub defaults: NetworkProfile,
    #[serde(default)]
    pub profiles: HashMap<String, NetworkProfile>,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Curated tokens for display
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContractAddresses {
    pub multisig: Option<Address>,
    pub position_manager: Option<Address>,
    pub factory: Option<Address>,
    pub wrapped_native: Option<Address>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkProfile {
    pub rpc_url: Option<String>,
    pub chain_id: Option<ChainId>,
    pub account: Option<Address>,
    pub native_symbol: Option<String>,
    pub gas_margin: Option<Gas>,
    pub gas_limit: Option<Gas>,
    #[serde(default)]
    pub contracts: ContractAddresses,
}

impl NetworkProfile {
    /// Fields set in `overlay` win
    pub fn merged_with(self, overlay: &NetworkProfile) -> NetworkProfile {
        NetworkProfile {
            rpc_url: overlay.rpc_url.clone().or(self.rpc_url),
            chain_id: overlay.chain_id.or(self.chain_id),
            account: overlay.account.or(self.account),
            native_symbol: overlay.native_symbol.clone().or(self.native_symbol),
            gas_margin: overlay.gas_margin.or(self.gas_margin),
            gas_limit: overlay.gas_limit.or(self.gas_limit),
            contracts: ContractAddresses {
                multisig: overlay.contracts.multisig.or(self.contracts.multisig),
                position_manager: overlay
                    .contracts
                    .position_manager
                    .or(self.contracts.position_manager),
                factory: overlay.contracts.factory.or(self.contracts.factory),
                wrapped_native: overlay
                    .contracts
                    .wrapped_native
                    .or(self.contracts.wrapped_native),
            },
        }
    }
}

/// Flag/environment overrides collected from the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub profile: NetworkProfile,
    pub api_key: Option<String>,
    pub app_url: Option<String>,
}

/// Fully resolved settings used by the command handlers
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rpc: RpcConfig,
    pub chain_id: Option<ChainId>,
    pub account: Option<Address>,
    pub native_symbol: String,
    pub contracts: ContractAddresses,
    pub gas: GasSettings,
    pub exchange: ExchangeConfig,
    pub tokens: Vec<TokenInfo>,
}

impl Settings {
    pub fn multisig(&self) -> CliResult<Address> {
        self.contracts
            .multisig
            .ok_or(CliError::MissingSetting("contracts.multisig"))
    }

    pub fn position_manager(&self) -> CliResult<Address> {
        self.contracts
            .position_manager
            .ok_or(CliError::MissingSetting("contracts.position_manager"))
    }

    pub fn factory(&self) -> CliResult<Address> {
        self.contracts
            .factory
            .ok_or(CliError::MissingSetting("contracts.factory"))
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".dex").join(DEFAULT_CONFIG_FILENAME)
    } else {
        PathBuf::from("./dex-cli.toml")
    }
}

pub fn config_path(path: Option<&str>) -> PathBuf {
    path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the config; a missing default file is not an error
pub fn load_config(path: Option<&str>) -> CliResult<CliConfig> {
    let config_path = config_path(path);

    if !config_path.exists() {
        if path.is_some() {
            return Err(CliError::ConfigError(format!(
                "Configuration file not found: {}",
                config_path.display()
            )));
        }
        return Ok(CliConfig::default());
    }

    parse_file(&config_path)
}

fn parse_file(path: &Path) -> CliResult<CliConfig> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CliError::ConfigError(format!("Failed to read config: {}", e)))?;

    toml::from_str(&raw).map_err(|e| CliError::ConfigError(format!("Invalid CLI config: {}", e)))
}

pub fn save_config(path: Option<&str>, config: &CliConfig) -> CliResult<()> {
    let config_path = config_path(path);
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CliError::ConfigError(format!("Failed to create config directory: {}", e))
        })?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| CliError::ConfigError(format!("Failed to serialize config: {}", e)))?;
    fs::write(&config_path, data)
        .map_err(|e| CliError::ConfigError(format!("Failed to write config: {}", e)))?;
    Ok(())
}

pub fn resolve_profile<'a>(config: &'a CliConfig, name: &str) -> Option<&'a NetworkProfile> {
    config.profiles.get(name)
}

pub fn resolve_settings(
    config: &CliConfig,
    profile_name: Option<&str>,
    overrides: &Overrides,
) -> CliResult<Settings> {
    let mut profile = config.defaults.clone();

    if let Some(name) = profile_name.or(config.default_profile.as_deref()) {
        let named = resolve_profile(config, name)
            .ok_or_else(|| CliError::ConfigError(format!("Unknown profile '{}'", name)))?;
        profile = profile.merged_with(named);
    }
    let profile = profile.merged_with(&overrides.profile);

    let mut rpc = RpcConfig::default();
    if let Some(url) = profile.rpc_url {
        rpc.url = url;
    }

    let mut gas = GasSettings::default();
    if let Some(margin) = profile.gas_margin {
        gas.margin = margin;
    }
    gas.custom_gas_limit = profile.gas_limit;

    let mut exchange = config.exchange.clone();
    if overrides.api_key.is_some() {
        exchange.api_key = overrides.api_key.clone();
    }
    if overrides.app_url.is_some() {
        exchange.app_url = overrides.app_url.clone();
    }

    Ok(Settings {
        rpc,
        chain_id: profile.chain_id,
        account: profile.account,
        native_symbol: profile.native_symbol.unwrap_or_else(|| "ETH".to_string()),
        contracts: profile.contracts,
        gas,
        exchange,
        tokens: config.tokens.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_wins() {
        let base = NetworkProfile {
            rpc_url: Some("http://base".into()),
            chain_id: Some(1),
            ..Default::default()
        };
        let overlay = NetworkProfile {
            chain_id: Some(11155111),
            ..Default::default()
        };
        let merged = base.merged_with(&overlay);
        assert_eq!(merged.rpc_url.as_deref(), Some("http://base"));
        assert_eq!(merged.chain_id, Some(11155111));
    }

    #[test]
    fn test_missing_contract_is_reported() {
        let settings = resolve_settings(&CliConfig::default(), None, &Overrides::default()).unwrap();
        assert!(matches!(
            settings.multisig(),
            Err(CliError::MissingSetting("contracts.multisig"))
        ));
        assert_eq!(settings.rpc, RpcConfig::default());
        assert_eq!(settings.native_symbol, "ETH");
    }

    #[test]
    fn test_unknown_profile() {
        let err = resolve_settings(&CliConfig::default(), Some("nope"), &Overrides::default());
        assert!(matches!(err, Err(CliError::ConfigError(_))));
    }
}
