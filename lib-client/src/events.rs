//! Contract event watching
//!
//! Logs are pulled with `eth_getLogs` from the last seen block forward and
//! pushed into a channel. Only mined logs (with a block number) are forwarded.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use lib_types::{Address, B256};

use crate::contract::{ContractClient, Log, LogFilter};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct EventSubscription {
    pub address: Address,
    /// Event signature hash
    pub topic0: B256,
    /// First block to scan; `None` starts at the current head
    pub from_block: Option<u64>,
    pub poll_interval: Duration,
}

impl EventSubscription {
    pub fn new(address: Address, topic0: B256) -> Self {
        Self {
            address,
            topic0,
            from_block: None,
            poll_interval: Duration::from_secs(4),
        }
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Receiving end of a subscription; dropping it stops the watcher
pub struct EventStream {
    rx: mpsc::Receiver<Log>,
    task: JoinHandle<()>,
}

impl EventStream {
    pub async fn next(&mut self) -> Option<Log> {
        self.rx.recv().await
    }

    pub fn cancel(&self) {
        self.task.abort();
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn watch_events(client: Arc<dyn ContractClient>, sub: EventSubscription) -> EventStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sub.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut next_block = sub.from_block;

        loop {
            ticker.tick().await;

            let head = match client.block_number().await {
                Ok(head) => head,
                Err(e) => {
                    warn!("Event watcher: block number unavailable: {}", e);
                    continue;
                }
            };
            let start = *next_block.get_or_insert(head);
            if head < start {
                continue;
            }

            let filter = LogFilter {
                address: sub.address,
                topic0: sub.topic0,
                from_block: start,
                to_block: head,
            };
            let logs = match client.logs(&filter).await {
                Ok(logs) => logs,
                Err(e) => {
                    warn!("Event watcher: log query {}..={} failed: {}", start, head, e);
                    continue;
                }
            };

            debug!("Event watcher: {} logs in {}..={}", logs.len(), start, head);
            for log in logs.into_iter().filter(|l| l.block_number.is_some()) {
                if tx.send(log).await.is_err() {
                    return;
                }
            }
            next_block = Some(head + 1);
        }
    });

    EventStream { rx, task }
}
