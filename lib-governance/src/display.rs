//! Display reconciliation
//!
//! Pure derivation from an on-chain record plus whatever context could be
//! loaded. Nothing here is stored; the view is rebuilt on every read.

use alloy_sol_types::SolCall;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use lib_client::abi::IERC20;
use lib_types::{format_units, Address, Timestamp, U256};

use crate::registry::ResolvedToken;
use crate::tx::{MultisigConfig, MultisigTransaction, MultisigTxId};

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Native coin transfer
    Eth,
    /// `transfer(to, amount)` on a token contract
    Token,
    Unknown,
}

/// Derived status; decline votes are not observable on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Pending,
    Approved,
    Executed,
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayStatus::Pending => write!(f, "pending"),
            DisplayStatus::Approved => write!(f, "approved"),
            DisplayStatus::Executed => write!(f, "executed"),
        }
    }
}

/// Earliest execution time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deadline {
    /// `proposed_timestamp + execution_delay`
    Known { timestamp: Timestamp },
    /// Config unavailable; only the proposal time is known
    Unknown { proposed_at: Timestamp },
}

impl Deadline {
    pub fn new(proposed_at: Timestamp, config: Option<&MultisigConfig>) -> Self {
        match config {
            Some(config) => Deadline::Known {
                timestamp: proposed_at.saturating_add(config.execution_delay),
            },
            None => Deadline::Unknown { proposed_at },
        }
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Deadline::Known { timestamp } => Some(*timestamp),
            Deadline::Unknown { .. } => None,
        }
    }

    pub fn to_local(&self) -> Option<DateTime<Local>> {
        self.timestamp()
            .and_then(to_utc)
            .map(|t| t.with_timezone(&Local))
    }
}

fn to_utc(ts: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(i64::try_from(ts).ok()?, 0)
}

fn render(ts: Timestamp) -> String {
    match to_utc(ts) {
        Some(t) => t.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => ts.to_string(),
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::Known { timestamp } => write!(f, "{}", render(*timestamp)),
            Deadline::Unknown { proposed_at } => {
                write!(f, "unknown (proposed {})", render(*proposed_at))
            }
        }
    }
}

/// What the payload of a transaction moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub kind: TxKind,
    pub recipient: Address,
    /// Token contract for `Token`
    pub token: Option<Address>,
    pub amount: Option<U256>,
}

pub fn classify(tx: &MultisigTransaction) -> Classified {
    if tx.data.is_empty() && tx.value > U256::ZERO {
        return Classified {
            kind: TxKind::Eth,
            recipient: tx.to,
            token: None,
            amount: Some(tx.value),
        };
    }

    let is_transfer = tx.data.get(..4) == Some(IERC20::transferCall::SELECTOR.as_slice());
    if is_transfer {
        if let Ok(call) = IERC20::transferCall::abi_decode(&tx.data, true) {
            return Classified {
                kind: TxKind::Token,
                recipient: call.to,
                token: Some(tx.to),
                amount: Some(call.amount),
            };
        }
    }

    Classified {
        kind: TxKind::Unknown,
        recipient: tx.to,
        token: None,
        amount: None,
    }
}

/// Executed wins, then approvals against the requirement
pub fn derive_status(tx: &MultisigTransaction) -> DisplayStatus {
    if tx.executed {
        DisplayStatus::Executed
    } else if tx.num_approvals >= tx.required_approvals {
        DisplayStatus::Approved
    } else {
        DisplayStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDisplayData {
    pub id: MultisigTxId,
    pub kind: TxKind,
    pub amount: String,
    pub symbol: String,
    pub recipient: Address,
    pub status: DisplayStatus,
    pub deadline: Deadline,
    pub can_execute: bool,
    pub can_vote: bool,
    pub num_approvals: U256,
    pub num_votes: U256,
    pub required_approvals: U256,
}

/// Context gathered around one record
#[derive(Debug, Clone, Copy)]
pub struct DisplayInputs<'a> {
    pub config: Option<&'a MultisigConfig>,
    /// Resolved token for `Token` transfers
    pub token: Option<&'a ResolvedToken>,
    pub native_symbol: &'a str,
    pub is_owner: bool,
    /// Result of the on-chain `txAllowed` predicate
    pub tx_allowed: bool,
}

pub fn derive_display(tx: &MultisigTransaction, inputs: DisplayInputs<'_>) -> TransactionDisplayData {
    let classified = classify(tx);

    let (amount, symbol) = match (classified.kind, classified.amount, inputs.token) {
        (TxKind::Eth, Some(value), _) => (format_units(value, 18), inputs.native_symbol.to_string()),
        (TxKind::Token, Some(amount), Some(token)) => {
            (format_units(amount, token.decimals), token.symbol.clone())
        }
        (TxKind::Token, Some(amount), None) => (
            format_units(amount, lib_types::DEFAULT_DECIMALS),
            lib_types::PLACEHOLDER_SYMBOL.to_string(),
        ),
        _ => (UNKNOWN.to_string(), UNKNOWN.to_string()),
    };

    TransactionDisplayData {
        id: tx.id,
        kind: classified.kind,
        amount,
        symbol,
        recipient: classified.recipient,
        status: derive_status(tx),
        deadline: Deadline::new(tx.proposed_timestamp, inputs.config),
        can_execute: inputs.tx_allowed,
        can_vote: inputs.is_owner && !tx.executed,
        num_approvals: tx.num_approvals,
        num_votes: tx.num_votes,
        required_approvals: tx.required_approvals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TokenSource;
    use lib_types::Bytes;

    fn record() -> MultisigTransaction {
        MultisigTransaction {
            id: 0,
            to: Address::repeat_byte(0x0a),
            value: U256::ZERO,
            data: Bytes::new(),
            proposed_timestamp: 1_700_000_000,
            executed: false,
            num_approvals: U256::from(1u64),
            num_votes: U256::from(1u64),
            required_approvals: U256::from(2u64),
        }
    }

    fn config(delay: u64) -> MultisigConfig {
        MultisigConfig {
            num_owners: U256::from(3u64),
            vote_pass_threshold: U256::from(2u64),
            execution_delay: delay,
            num_txs: 1,
        }
    }

    fn inputs<'a>() -> DisplayInputs<'a> {
        DisplayInputs {
            config: None,
            token: None,
            native_symbol: "ETH",
            is_owner: true,
            tx_allowed: false,
        }
    }

    #[test]
    fn test_status_derivation() {
        let mut tx = record();
        assert_eq!(derive_status(&tx), DisplayStatus::Pending);

        tx.num_approvals = U256::from(2u64);
        assert_eq!(derive_status(&tx), DisplayStatus::Approved);

        tx.num_approvals = U256::from(3u64);
        assert_eq!(derive_status(&tx), DisplayStatus::Approved);

        // executed wins even with too few approvals
        tx.num_approvals = U256::ZERO;
        tx.executed = true;
        assert_eq!(derive_status(&tx), DisplayStatus::Executed);
    }

    #[test]
    fn test_eth_transfer() {
        let mut tx = record();
        tx.value = U256::from(1_500_000_000_000_000_000u128);
        let view = derive_display(&tx, inputs());
        assert_eq!(view.kind, TxKind::Eth);
        assert_eq!(view.amount, "1.5");
        assert_eq!(view.symbol, "ETH");
        assert_eq!(view.recipient, tx.to);
    }

    #[test]
    fn test_token_transfer() {
        let recipient = Address::repeat_byte(0x0b);
        let mut tx = record();
        tx.data = IERC20::transferCall {
            to: recipient,
            amount: U256::from(2_500_000u64),
        }
        .abi_encode()
        .into();

        let token = ResolvedToken {
            address: tx.to,
            symbol: "USDT".into(),
            decimals: 6,
            source: TokenSource::Registry,
        };
        let view = derive_display(
            &tx,
            DisplayInputs {
                token: Some(&token),
                ..inputs()
            },
        );
        assert_eq!(view.kind, TxKind::Token);
        assert_eq!(view.amount, "2.5");
        assert_eq!(view.symbol, "USDT");
        assert_eq!(view.recipient, recipient);
    }

    #[test]
    fn test_opaque_payload_is_unknown() {
        let mut tx = record();
        tx.value = U256::from(1u64);
        tx.data = vec![0xde, 0xad, 0xbe, 0xef, 0x00].into();
        let view = derive_display(&tx, inputs());
        assert_eq!(view.kind, TxKind::Unknown);
        assert_eq!(view.amount, UNKNOWN);
        assert_eq!(view.symbol, UNKNOWN);
    }

    #[test]
    fn test_zero_value_empty_payload_is_unknown() {
        let view = derive_display(&record(), inputs());
        assert_eq!(view.kind, TxKind::Unknown);
    }

    #[test]
    fn test_vote_and_execute_flags() {
        let mut tx = record();
        let view = derive_display(&tx, DisplayInputs { tx_allowed: true, ..inputs() });
        assert!(view.can_vote);
        assert!(view.can_execute);

        tx.executed = true;
        let view = derive_display(&tx, inputs());
        assert!(!view.can_vote);

        let view = derive_display(&record(), DisplayInputs { is_owner: false, ..inputs() });
        assert!(!view.can_vote);
    }

    #[test]
    fn test_deadline_known_and_unknown() {
        let cfg = config(3_600);
        let known = Deadline::new(1_700_000_000, Some(&cfg));
        assert_eq!(known, Deadline::Known { timestamp: 1_700_003_600 });
        assert_eq!(known.to_string(), "2023-11-14 23:13 UTC");

        let unknown = Deadline::new(1_700_000_000, None);
        assert_eq!(unknown.timestamp(), None);
        assert_eq!(unknown.to_string(), "unknown (proposed 2023-11-14 22:13 UTC)");
    }
}
