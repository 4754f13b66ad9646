use ed25519_dalek::PublicKey;
use ed25519_dalek::Signature;
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serializer};
use std::borrow::Cow;
use std::convert::TryFrom;

pub use hex_buffer_serde::Hex;

// a single-purpose type for use in `#[serde(with)]`
pub enum EdPublicKeyHex {}

impl Hex<PublicKey> for EdPublicKeyHex {
    type Error = String;

    fn create_bytes(public_key: &PublicKey) -> Cow<[u8]> {
        public_key.as_ref().into()
    }

    fn from_bytes(bytes: &[u8]) -> Result<PublicKey, String> {
        PublicKey::from_bytes(bytes).map_err(|e| format!("{}", e))
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum EdSignatureHex {}

impl Hex<Signature> for EdSignatureHex {
    type Error = String;

    fn create_bytes(sig: &Signature) -> Cow<[u8]> {
        Cow::from(sig.to_bytes().to_vec())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Signature, String> {
        Signature::try_from(bytes).map_err(|e| format!("{}", e))
    }
}

/// Big integers as big-endian hex strings
pub mod biguint_hex {
    use super::*;

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(16))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 16)
            .ok_or_else(|| de::Error::custom(format!("invalid hex integer {:?}", s)))
    }
}

/// Lists of big integers as lists of hex strings
pub mod biguint_hex_vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(values: &[BigUint], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_str_radix(16))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<BigUint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let strings = Vec::<String>::deserialize(deserializer)?;
        strings
            .iter()
            .map(|s| {
                BigUint::parse_bytes(s.as_bytes(), 16)
                    .ok_or_else(|| de::Error::custom(format!("invalid hex integer {:?}", s)))
            })
            .collect()
    }
}
