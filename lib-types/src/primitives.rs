//! Canonical Primitive Types for the DEX client
//!
//! EVM-facing values (`Address`, `U256`, `Bytes`, `B256`) come straight from
//! `alloy-primitives` so they interoperate with the ABI codec. Everything the
//! client tracks on its own side (hashes, chain ids, gas) is defined here.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use alloy_primitives::{Address, Bytes, B256, U256};

use crate::errors::TypesError;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// EIP-155 chain identifier
pub type ChainId = u64;

/// Gas units
pub type Gas = u64;

/// Unix timestamp in seconds
pub type Timestamp = u64;

// ============================================================================
// HASH TYPES
// ============================================================================

/// 32-byte transaction hash
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Create a new TxHash from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed TxHash
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Short form used in log lines (`0x1234abcd…`)
    pub fn short(&self) -> String {
        format!("0x{}…", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| TypesError::InvalidLength { expected: 32, actual: v.len() })?;
        Ok(Self(array))
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<B256> for TxHash {
    fn from(value: B256) -> Self {
        Self(value.0)
    }
}

impl From<TxHash> for B256 {
    fn from(value: TxHash) -> Self {
        B256::new(value.0)
    }
}

impl AsRef<[u8]> for TxHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_hash_basics() {
        let hash = TxHash::new([2u8; 32]);
        assert!(!hash.is_zero());
        assert_eq!(hash.as_bytes(), &[2u8; 32]);
        assert!(TxHash::zero().is_zero());
    }

    #[test]
    fn test_tx_hash_parse_with_and_without_prefix() {
        let text = format!("0x{}", "ab".repeat(32));
        let parsed: TxHash = text.parse().unwrap();
        assert_eq!(parsed, TxHash::new([0xab; 32]));
        assert_eq!(parsed.to_string(), text);

        let bare: TxHash = "cd".repeat(32).parse().unwrap();
        assert_eq!(bare, TxHash::new([0xcd; 32]));
    }

    #[test]
    fn test_tx_hash_rejects_wrong_length() {
        let result: Result<TxHash, _> = "0x1234".parse();
        assert!(matches!(
            result,
            Err(TypesError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn test_tx_hash_json_is_hex_string() {
        let hash = TxHash::new([1u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(32)));
        let back: TxHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_b256_conversion() {
        let b = B256::repeat_byte(7);
        let hash: TxHash = b.into();
        let back: B256 = hash.into();
        assert_eq!(b, back);
    }
}
