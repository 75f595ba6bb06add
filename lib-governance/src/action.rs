//! Multisig actions
//!
//! Every governance action travels through the multisig twice: the inner call
//! (`approveTx(5)`, `addOwner(a)`, ...) is the payload of an outer
//! `proposeTx(multisig, 0, inner)`. The inner call only runs once the
//! meta-transaction itself has enough votes and gets executed.

use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::fmt;

use lib_client::ContractCall;
use lib_types::{Address, Bytes, U256};

use crate::abi::IMultisig;
use crate::tx::MultisigTxId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MultisigAction {
    /// Plain proposal with a caller-chosen target
    Propose { to: Address, value: U256, data: Bytes },
    Approve { id: MultisigTxId },
    Decline { id: MultisigTxId },
    Execute { id: MultisigTxId },
    AddOwner { owner: Address },
    RemoveOwner { owner: Address },
    ChangeThreshold { threshold: u64 },
    /// Execution delay in seconds
    ChangeDelay { delay: u64 },
}

impl MultisigAction {
    /// Whether the action targets the multisig itself
    pub fn is_governance(&self) -> bool {
        !matches!(self, MultisigAction::Propose { .. })
    }

    /// Payload of the proposed meta-transaction
    pub fn inner_call(&self) -> Bytes {
        let encoded = match self {
            MultisigAction::Propose { data, .. } => return data.clone(),
            MultisigAction::Approve { id } => {
                IMultisig::approveTxCall { txId: U256::from(*id) }.abi_encode()
            }
            MultisigAction::Decline { id } => {
                IMultisig::declineTxCall { txId: U256::from(*id) }.abi_encode()
            }
            MultisigAction::Execute { id } => {
                IMultisig::executeTxCall { txId: U256::from(*id) }.abi_encode()
            }
            MultisigAction::AddOwner { owner } => {
                IMultisig::addOwnerCall { owner: *owner }.abi_encode()
            }
            MultisigAction::RemoveOwner { owner } => {
                IMultisig::removeOwnerCall { owner: *owner }.abi_encode()
            }
            MultisigAction::ChangeThreshold { threshold } => IMultisig::changeThresholdCall {
                threshold: U256::from(*threshold),
            }
            .abi_encode(),
            MultisigAction::ChangeDelay { delay } => IMultisig::changeDelayCall {
                delay: U256::from(*delay),
            }
            .abi_encode(),
        };
        encoded.into()
    }

    /// Target of the meta-transaction
    pub fn target(&self, multisig: Address) -> Address {
        match self {
            MultisigAction::Propose { to, .. } => *to,
            _ => multisig,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            MultisigAction::Propose { value, .. } => *value,
            _ => U256::ZERO,
        }
    }

    /// The single on-chain write for this action
    pub fn outer_call(&self, multisig: Address) -> ContractCall {
        ContractCall::encode(
            multisig,
            &IMultisig::proposeTxCall {
                to: self.target(multisig),
                value: self.value(),
                data: self.inner_call(),
            },
        )
    }
}

impl fmt::Display for MultisigAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultisigAction::Propose { to, .. } => write!(f, "Propose transaction to {}", to),
            MultisigAction::Approve { id } => write!(f, "Approve multisig tx #{}", id),
            MultisigAction::Decline { id } => write!(f, "Decline multisig tx #{}", id),
            MultisigAction::Execute { id } => write!(f, "Execute multisig tx #{}", id),
            MultisigAction::AddOwner { owner } => write!(f, "Add owner {}", owner),
            MultisigAction::RemoveOwner { owner } => write!(f, "Remove owner {}", owner),
            MultisigAction::ChangeThreshold { threshold } => {
                write!(f, "Change threshold to {}", threshold)
            }
            MultisigAction::ChangeDelay { delay } => write!(f, "Change delay to {}s", delay),
        }
    }
}
