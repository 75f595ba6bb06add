//! Exchange status polling

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use lib_client::{spawn_poll, ClientError, PollHandle};

use crate::client::ExchangeFetcher;
use crate::types::Exchange;

/// Poll `id` every `interval` until it reaches a terminal status
pub fn watch_exchange(
    fetcher: Arc<dyn ExchangeFetcher>,
    id: impl Into<String>,
    interval: Duration,
) -> PollHandle<Exchange> {
    let id = id.into();
    info!("Watching exchange {} every {:?}", id, interval);
    spawn_poll(
        interval,
        move || {
            let fetcher = fetcher.clone();
            let id = id.clone();
            async move {
                fetcher
                    .exchange(&id)
                    .await
                    .map_err(|e| ClientError::Transport(e.to_string()))
            }
        },
        |exchange: &Exchange| exchange.status.is_terminal(),
    )
}
