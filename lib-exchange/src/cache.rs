//! Currency list cache

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::client::ExchangeFetcher;
use crate::errors::ExchangeResult;
use crate::types::{Currency, Exchange};

pub struct CurrencyCache {
    ttl: Duration,
    entry: RwLock<Option<(Instant, Arc<Vec<Currency>>)>>,
}

impl CurrencyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Cached list if still fresh
    pub fn fresh(&self) -> Option<Arc<Vec<Currency>>> {
        let entry = self.entry.read();
        match entry.as_ref() {
            Some((at, list)) if at.elapsed() < self.ttl => Some(list.clone()),
            _ => None,
        }
    }

    pub fn store(&self, list: Vec<Currency>) -> Arc<Vec<Currency>> {
        let list = Arc::new(list);
        *self.entry.write() = Some((Instant::now(), list.clone()));
        list
    }

    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }
}

/// Fetcher whose currency list is served from a [`CurrencyCache`]
pub struct CachedFetcher<F> {
    inner: F,
    cache: CurrencyCache,
}

impl<F: ExchangeFetcher> CachedFetcher<F> {
    pub fn new(inner: F, ttl: Duration) -> Self {
        Self {
            inner,
            cache: CurrencyCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn cache(&self) -> &CurrencyCache {
        &self.cache
    }
}

#[async_trait]
impl<F: ExchangeFetcher> ExchangeFetcher for CachedFetcher<F> {
    async fn exchange(&self, id: &str) -> ExchangeResult<Exchange> {
        self.inner.exchange(id).await
    }

    async fn currencies(&self) -> ExchangeResult<Vec<Currency>> {
        if let Some(list) = self.cache.fresh() {
            debug!("Currency list served from cache ({} entries)", list.len());
            return Ok(list.as_ref().clone());
        }
        let list = self.inner.currencies().await?;
        debug!("Currency list refreshed ({} entries)", list.len());
        Ok(self.cache.store(list).as_ref().clone())
    }
}
