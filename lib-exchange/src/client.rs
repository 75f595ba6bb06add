//! SimpleSwap HTTP access
//!
//! Exchange lookups go through the app's proxy route when an app URL is
//! configured, otherwise straight to the SimpleSwap API with the API key.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::ExchangeConfig;
use crate::errors::{ExchangeError, ExchangeResult};
use crate::types::{Currency, Exchange};

#[async_trait]
pub trait ExchangeFetcher: Send + Sync {
    async fn exchange(&self, id: &str) -> ExchangeResult<Exchange>;

    async fn currencies(&self) -> ExchangeResult<Vec<Currency>>;
}

pub struct SimpleSwapClient {
    http: reqwest::Client,
    config: ExchangeConfig,
}

impl SimpleSwapClient {
    pub fn new(config: ExchangeConfig) -> ExchangeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    fn api_key(&self) -> ExchangeResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(ExchangeError::MissingApiKey)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> ExchangeResult<T> {
        trace!("GET {}", url);
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("GET {} returned {}", url, status);
            return Err(ExchangeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn trimmed(base: &str) -> &str {
    base.trim_end_matches('/')
}

#[async_trait]
impl ExchangeFetcher for SimpleSwapClient {
    async fn exchange(&self, id: &str) -> ExchangeResult<Exchange> {
        let result: Option<Exchange> = match &self.config.app_url {
            Some(app) => {
                let url = format!("{}/api/simpleswap/get-exchange", trimmed(app));
                self.get(&url, &[("exchangeId", id)]).await?
            }
            None => {
                let url = format!("{}/get_exchange", trimmed(&self.config.api_url));
                self.get(&url, &[("api_key", self.api_key()?), ("id", id)]).await?
            }
        };
        result.ok_or_else(|| ExchangeError::NotFound(id.to_string()))
    }

    async fn currencies(&self) -> ExchangeResult<Vec<Currency>> {
        let url = format!("{}/get_all_currencies", trimmed(&self.config.api_url));
        self.get(&url, &[("api_key", self.api_key()?)]).await
    }
}
