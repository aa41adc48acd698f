use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ChainError;

/// A 32-byte block hash.
///
/// Parses `0x`-prefixed hex in either case; always displays (and serializes)
/// as canonical lowercase hex with the `0x` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for BlockHash {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| ChainError::Decode {
            what: "block hash",
            reason: e.to_string(),
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| ChainError::Decode {
            what: "block hash",
            reason: format!("expected 32 bytes, got {}", b.len()),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    #[test]
    fn parses_and_displays_canonically() {
        let from_lower: BlockHash = CANONICAL.parse().unwrap();
        let from_upper: BlockHash = CANONICAL.to_uppercase().replace("0X", "0x").parse().unwrap();
        assert_eq!(from_lower, from_upper);
        assert_eq!(from_lower.to_string(), CANONICAL);
    }

    #[test]
    fn accepts_missing_prefix() {
        let bare: BlockHash = CANONICAL.trim_start_matches("0x").parse().unwrap();
        assert_eq!(bare.to_string(), CANONICAL);
    }

    #[test]
    fn rejects_wrong_length_and_bad_digits() {
        assert!("0x1234".parse::<BlockHash>().is_err());
        assert!(CANONICAL.replace('a', "g").parse::<BlockHash>().is_err());
    }

    #[test]
    fn serde_round_trips_as_canonical_string() {
        let hash: BlockHash = CANONICAL.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{CANONICAL}\""));
        let back: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
