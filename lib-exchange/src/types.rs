//! SimpleSwap payloads
//!
//! Only the fields the client uses are typed; everything is optional on the
//! wire because the API omits fields freely between exchange stages.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExchangeStatus {
    Waiting,
    Confirming,
    Exchanging,
    Sending,
    Finished,
    Failed,
    Refunded,
    Expired,
    Other(String),
}

impl ExchangeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExchangeStatus::Finished
                | ExchangeStatus::Failed
                | ExchangeStatus::Refunded
                | ExchangeStatus::Expired
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExchangeStatus::Waiting => "waiting",
            ExchangeStatus::Confirming => "confirming",
            ExchangeStatus::Exchanging => "exchanging",
            ExchangeStatus::Sending => "sending",
            ExchangeStatus::Finished => "finished",
            ExchangeStatus::Failed => "failed",
            ExchangeStatus::Refunded => "refunded",
            ExchangeStatus::Expired => "expired",
            ExchangeStatus::Other(other) => other,
        }
    }
}

impl From<&str> for ExchangeStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "waiting" => ExchangeStatus::Waiting,
            "confirming" => ExchangeStatus::Confirming,
            "exchanging" => ExchangeStatus::Exchanging,
            "sending" => ExchangeStatus::Sending,
            "finished" => ExchangeStatus::Finished,
            "failed" => ExchangeStatus::Failed,
            "refunded" => ExchangeStatus::Refunded,
            "expired" => ExchangeStatus::Expired,
            _ => ExchangeStatus::Other(value.to_string()),
        }
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExchangeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExchangeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ExchangeStatus::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub id: String,
    pub status: ExchangeStatus,
    #[serde(default)]
    pub currency_from: String,
    #[serde(default)]
    pub currency_to: String,
    #[serde(default)]
    pub amount_from: Option<String>,
    #[serde(default)]
    pub expected_amount: Option<String>,
    #[serde(default)]
    pub amount_to: Option<String>,
    #[serde(default)]
    pub address_from: Option<String>,
    #[serde(default)]
    pub address_to: Option<String>,
    #[serde(default)]
    pub tx_from: Option<String>,
    #[serde(default)]
    pub tx_to: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Exchange {
    pub fn pair(&self) -> String {
        format!(
            "{} → {}",
            self.currency_from.to_uppercase(),
            self.currency_to.to_uppercase()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub has_extra_id: bool,
}
