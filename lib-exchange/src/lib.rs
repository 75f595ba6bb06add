//! Cross-chain exchange tracking
//!
//! Read-only: looks up SimpleSwap exchanges, caches the currency list and
//! polls an exchange until it settles.

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod types;
pub mod watch;

pub use cache::{CachedFetcher, CurrencyCache};
pub use client::{ExchangeFetcher, SimpleSwapClient};
pub use config::ExchangeConfig;
pub use errors::{ExchangeError, ExchangeResult};
pub use types::{Currency, Exchange, ExchangeStatus};
pub use watch::watch_exchange;
