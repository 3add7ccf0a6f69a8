//! Identities, heights and parent references.
//!
//! An [`Address`] is an opaque 20-byte identity supplied by the host. The
//! all-zero address is the null sentinel and is never a valid validator,
//! owner, facade or logic.
//!
//! Text forms are always `0x`-prefixed hex; bare hex is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// A 20-byte account identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The null sentinel.
    pub const ZERO: Self = Self([0; ADDRESS_LEN]);

    /// Well-known identity of the block-producing engine
    /// (`0xffff…fffe`). Default Driver of a freshly deployed facade.
    pub const SYSTEM: Self = {
        let mut bytes = [0xff; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = 0xfe;
        Self(bytes)
    };

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address whose last byte is `seed`. Handy for fixtures.
    pub const fn from_low_u64(seed: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        let be = seed.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[ADDRESS_LEN - 8 + i] = be[i];
            i += 1;
        }
        Self(bytes)
    }

    /// Whether this is the null sentinel.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Raw bytes.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| Error::InvalidAddress(format!("missing 0x prefix: {s}")))?;
        let bytes = hex::decode(digits).map_err(|e| Error::InvalidAddress(e.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            Error::InvalidAddress(format!("expected {} bytes, got {}", ADDRESS_LEN, v.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ledger height as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(pub u64);

impl Height {
    /// Height `n` blocks below this one, saturating at genesis.
    #[must_use]
    pub const fn saturating_sub(self, n: u64) -> Self {
        Self(self.0.saturating_sub(n))
    }

    /// Height `n` blocks above this one.
    #[must_use]
    pub const fn saturating_add(self, n: u64) -> Self {
        Self(self.0.saturating_add(n))
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Height {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Opaque reference to the host state immediately preceding a call
/// (e.g. the parent block hash). Supplied by the host, never computed here.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParentRef(pub [u8; 32]);

impl ParentRef {
    /// All-zero reference.
    pub const EMPTY: Self = Self([0; 32]);
}

impl fmt::Debug for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParentRef(0x{})", hex::encode(self.0))
    }
}

impl Serialize for ParentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for ParentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| serde::de::Error::custom("parent reference must be 0x-prefixed"))?;
        let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("parent reference must be 32 bytes"))?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_null() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::SYSTEM.is_zero());
        assert!(!Address::from_low_u64(1).is_zero());
    }

    #[test]
    fn system_address_format() {
        assert_eq!(
            Address::SYSTEM.to_hex(),
            "0xfffffffffffffffffffffffffffffffffffffffe"
        );
    }

    #[test]
    fn parse_requires_prefix() {
        let a: Address = "0x0000000000000000000000000000000000000007".parse().unwrap();
        assert_eq!(a, Address::from_low_u64(7));
        assert!(matches!(
            "0000000000000000000000000000000000000007".parse::<Address>(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(serde_json::from_str::<Address>("\"0000000000000000000000000000000000000007\"").is_err());
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(Error::InvalidAddress(_))
        ));
        assert!("0xzz".parse::<Address>().is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let a = Address::from_low_u64(0xabcd);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"0x000000000000000000000000000000000000abcd\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn height_saturates() {
        assert_eq!(Height(0).saturating_sub(1), Height(0));
        assert_eq!(Height(5).saturating_add(2), Height(7));
    }
}
