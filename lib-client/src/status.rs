//! Transaction status state machine
//!
//! ```text
//! INITIAL ──begin──▶ PENDING ──submitted(hash)──▶ LOADING ──confirmed──▶ SUCCESS
//!    ▲                  │                            │
//!    │                  └──────────fail──────────────┴──────────────▶ ERROR
//!    └──────────────────────────── reset ◀────────── SUCCESS / ERROR
//! ```
//!
//! # Invariants
//!
//! 1. **Reset clears the hash**: whenever the status becomes `Initial` the stored
//!    hash and message are cleared in the same update. No observer can see
//!    `Initial` with a hash.
//! 2. **No skipping**: `Initial → Loading` is impossible; the wallet step is
//!    always represented by `Pending`.
//! 3. **Single flight**: `begin` fails while the store is `Pending`/`Loading`.
//!    This is a client-local guard only. Two stores, two processes or two
//!    wallets can still submit the same action; the contract gives no such
//!    guarantee.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use lib_types::TxHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    #[default]
    Initial,
    /// Wallet signature requested, not broadcast
    Pending,
    /// Broadcast, awaiting confirmation
    Loading,
    Success,
    Error,
}

impl TxStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TxStatus::Pending | TxStatus::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Success | TxStatus::Error)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxStatus::Initial => "INITIAL",
            TxStatus::Pending => "PENDING",
            TxStatus::Loading => "LOADING",
            TxStatus::Success => "SUCCESS",
            TxStatus::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Transaction already in flight ({0})")]
    InFlight(TxStatus),

    #[error("Invalid status transition {from} -> {to}")]
    InvalidTransition { from: TxStatus, to: TxStatus },
}

pub type StatusResult<T> = Result<T, StatusError>;

/// Point-in-time copy of a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: TxStatus,
    pub hash: Option<TxHash>,
    pub error: Option<String>,
}

/// Per-flow status container
#[derive(Debug, Default)]
pub struct TxStatusStore {
    inner: Mutex<StatusSnapshot>,
}

impl TxStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().clone()
    }

    pub fn status(&self) -> TxStatus {
        self.inner.lock().status
    }

    pub fn hash(&self) -> Option<TxHash> {
        self.inner.lock().hash
    }

    pub fn is_busy(&self) -> bool {
        self.status().is_in_flight()
    }

    /// Claim the store for a new submission (`→ Pending`)
    ///
    /// Terminal states are reset first, so a retry needs no explicit dismiss.
    pub fn begin(&self) -> StatusResult<()> {
        let mut inner = self.inner.lock();
        if inner.status.is_in_flight() {
            return Err(StatusError::InFlight(inner.status));
        }
        *inner = StatusSnapshot {
            status: TxStatus::Pending,
            hash: None,
            error: None,
        };
        debug!("status -> PENDING");
        Ok(())
    }

    /// Wallet returned a hash (`Pending → Loading`)
    pub fn submitted(&self, hash: TxHash) -> StatusResult<()> {
        let mut inner = self.inner.lock();
        if inner.status != TxStatus::Pending {
            return Err(StatusError::InvalidTransition {
                from: inner.status,
                to: TxStatus::Loading,
            });
        }
        inner.status = TxStatus::Loading;
        inner.hash = Some(hash);
        debug!("status -> LOADING ({})", hash.short());
        Ok(())
    }

    /// Receipt confirmed (`Loading → Success`)
    pub fn confirmed(&self) -> StatusResult<()> {
        let mut inner = self.inner.lock();
        if inner.status != TxStatus::Loading {
            return Err(StatusError::InvalidTransition {
                from: inner.status,
                to: TxStatus::Success,
            });
        }
        inner.status = TxStatus::Success;
        debug!("status -> SUCCESS");
        Ok(())
    }

    /// Any caught failure; the hash (if any) is kept for explorer links
    pub fn fail(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        inner.status = TxStatus::Error;
        inner.error = Some(message.into());
        debug!("status -> ERROR");
    }

    /// Back to `Initial`, clearing hash and message
    pub fn reset(&self) {
        *self.inner.lock() = StatusSnapshot::default();
        debug!("status -> INITIAL");
    }

    /// Generic setter that enforces the reset invariant at the store boundary
    pub fn set_status(&self, status: TxStatus) -> StatusResult<()> {
        match status {
            TxStatus::Initial => {
                self.reset();
                Ok(())
            }
            TxStatus::Pending => self.begin(),
            TxStatus::Loading => {
                let inner = self.inner.lock();
                Err(StatusError::InvalidTransition {
                    from: inner.status,
                    to: TxStatus::Loading,
                })
            }
            TxStatus::Success => self.confirmed(),
            TxStatus::Error => {
                self.fail("error");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    #[test]
    fn test_happy_path() {
        let store = TxStatusStore::new();
        assert_eq!(store.status(), TxStatus::Initial);

        store.begin().unwrap();
        assert_eq!(store.status(), TxStatus::Pending);
        assert_eq!(store.hash(), None);

        store.submitted(hash(1)).unwrap();
        assert_eq!(store.status(), TxStatus::Loading);
        assert_eq!(store.hash(), Some(hash(1)));

        store.confirmed().unwrap();
        assert_eq!(store.status(), TxStatus::Success);
        assert_eq!(store.hash(), Some(hash(1)));
    }

    #[test]
    fn test_reset_clears_hash() {
        let store = TxStatusStore::new();
        store.begin().unwrap();
        store.submitted(hash(2)).unwrap();
        store.fail("receipt timeout");

        let snap = store.snapshot();
        assert_eq!(snap.status, TxStatus::Error);
        assert_eq!(snap.hash, Some(hash(2)));

        store.set_status(TxStatus::Initial).unwrap();
        let snap = store.snapshot();
        assert_eq!(snap, StatusSnapshot::default());
    }

    #[test]
    fn test_cannot_skip_pending() {
        let store = TxStatusStore::new();
        let err = store.submitted(hash(3)).unwrap_err();
        assert_eq!(
            err,
            StatusError::InvalidTransition {
                from: TxStatus::Initial,
                to: TxStatus::Loading
            }
        );
        assert!(store.set_status(TxStatus::Loading).is_err());
        assert_eq!(store.hash(), None);
    }

    #[test]
    fn test_begin_rejected_while_in_flight() {
        let store = TxStatusStore::new();
        store.begin().unwrap();
        assert_eq!(store.begin(), Err(StatusError::InFlight(TxStatus::Pending)));

        store.submitted(hash(4)).unwrap();
        assert_eq!(store.begin(), Err(StatusError::InFlight(TxStatus::Loading)));
    }

    #[test]
    fn test_begin_after_terminal_resets_hash() {
        let store = TxStatusStore::new();
        store.begin().unwrap();
        store.submitted(hash(5)).unwrap();
        store.confirmed().unwrap();

        store.begin().unwrap();
        assert_eq!(store.status(), TxStatus::Pending);
        assert_eq!(store.hash(), None);
    }

    #[test]
    fn test_fail_before_hash_keeps_none() {
        let store = TxStatusStore::new();
        store.begin().unwrap();
        store.fail("simulation reverted");
        let snap = store.snapshot();
        assert_eq!(snap.status, TxStatus::Error);
        assert_eq!(snap.hash, None);
        assert_eq!(snap.error.as_deref(), Some("simulation reverted"));
    }
}
