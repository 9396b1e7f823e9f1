//! Solana 地址编解码
//!
//! 地址就是 32 字节 ed25519 公钥的 Base58 编码，没有版本字节，也没有校验和。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SweepError;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// System Program：`11111111111111111111111111111111`
    pub const SYSTEM_PROGRAM: Address = Address([0u8; 32]);

    pub fn from_public_key(public_key: [u8; 32]) -> Self {
        Self(public_key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // 32 字节的 Base58 编码最长 44 个字符
        if s.is_empty() || s.len() > 44 {
            return Err(SweepError::InvalidAddress(format!(
                "unexpected length {}: {}",
                s.len(),
                s
            )));
        }

        let decoded = bs58::decode(s)
            .into_vec()
            .map_err(|e| SweepError::InvalidAddress(format!("{}: {}", s, e)))?;

        let bytes: [u8; 32] = decoded.as_slice().try_into().map_err(|_| {
            SweepError::InvalidAddress(format!(
                "{} decodes to {} bytes, expected 32",
                s,
                decoded.len()
            ))
        })?;

        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
