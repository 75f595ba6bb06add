use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.simpleswap.io";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Base URL of the app exposing `/api/simpleswap/get-exchange`
    pub app_url: Option<String>,
    pub api_url: String,
    pub api_key: Option<String>,
    pub poll_interval_secs: u64,
    pub currency_cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            app_url: None,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            poll_interval_secs: 5,
            currency_cache_ttl_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl ExchangeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn currency_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.currency_cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
