//! Success notifications
//!
//! Sinks are fire-and-forget: a slow or broken sink must not affect the flow
//! that produced the notification.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use lib_types::{ChainId, TxHash};

/// Emitted once per confirmed write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Human label, e.g. "Approve multisig tx #3"
    pub action: String,
    pub chain_id: ChainId,
    pub hash: TxHash,
    /// Sender nonce, when the node reported it in time
    pub nonce: Option<u64>,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.nonce {
            Some(nonce) => info!(
                "✅ {} confirmed on chain {} (tx {}, nonce {})",
                n.action, n.chain_id, n.hash, nonce
            ),
            None => info!("✅ {} confirmed on chain {} (tx {})", n.action, n.chain_id, n.hash),
        }
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    received: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.lock().is_empty()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.received.lock().push(notification);
    }
}
