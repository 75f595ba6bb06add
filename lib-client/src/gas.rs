//! Gas limit policy
//!
//! Limit = estimate + margin, unless the user set a custom limit. Estimation-only
//! callers (fee previews) fall back to a fixed per-action default instead of
//! failing.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lib_types::Gas;

use crate::contract::{ContractCall, ContractClient};

/// Safety margin added on top of an estimate
pub const DEFAULT_GAS_MARGIN: Gas = 30_000;

/// Fallback limits when estimation is impossible
pub const COLLECT_FEES_GAS: Gas = 250_000;
pub const REMOVE_LIQUIDITY_GAS: Gas = 200_000;
pub const REVOKE_GAS: Gas = 50_000;
pub const APPROVE_GAS: Gas = 70_000;
pub const MINT_GAS: Gas = 500_000;
pub const MULTISIG_ACTION_GAS: Gas = 300_000;

/// User gas settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasSettings {
    /// Always wins when set
    pub custom_gas_limit: Option<Gas>,
    /// Added to every estimate
    pub margin: Gas,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            custom_gas_limit: None,
            margin: DEFAULT_GAS_MARGIN,
        }
    }
}

impl GasSettings {
    /// Limit to submit with, given a successful estimate
    pub fn limit_for(&self, estimate: Gas) -> Gas {
        self.custom_gas_limit
            .unwrap_or_else(|| estimate.saturating_add(self.margin))
    }
}

/// Per-concern store for gas settings
#[derive(Debug, Default)]
pub struct GasSettingsStore {
    inner: RwLock<GasSettings>,
}

impl GasSettingsStore {
    pub fn new(settings: GasSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn get(&self) -> GasSettings {
        *self.inner.read()
    }

    pub fn set_custom_limit(&self, limit: Option<Gas>) {
        self.inner.write().custom_gas_limit = limit;
    }

    pub fn set_margin(&self, margin: Gas) {
        self.inner.write().margin = margin;
    }

    pub fn reset(&self) {
        *self.inner.write() = GasSettings::default();
    }
}

/// Estimate a gas limit for display, never failing
///
/// Missing client or call (precondition not met) and estimation errors both
/// degrade to `fallback`.
pub async fn estimate_gas_limit(
    client: Option<&dyn ContractClient>,
    call: Option<&ContractCall>,
    settings: &GasSettings,
    fallback: Gas,
) -> Gas {
    if let Some(custom) = settings.custom_gas_limit {
        return custom;
    }

    let (client, call) = match (client, call) {
        (Some(client), Some(call)) => (client, call),
        _ => return fallback,
    };

    match client.estimate_gas(call).await {
        Ok(estimate) => settings.limit_for(estimate),
        Err(e) => {
            debug!("Gas estimation failed, using default {}: {}", fallback, e);
            fallback
        }
    }
}
