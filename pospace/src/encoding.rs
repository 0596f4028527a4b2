//! Serde adapters for the JSON proof encoding.
//!
//! Binary fields (labels, branches, seeds, keys, signatures) travel as
//! standard base64 strings per the proof wire format.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serializer};

/// `Vec<u8>` as a base64 string.
pub mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64.decode(s).map_err(serde::de::Error::custom)
    }
}

/// `Vec<Vec<u8>>` as a list of base64 strings (Merkle branches).
pub mod base64_list {
    use super::*;

    pub fn serialize<S: Serializer>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(list.iter().map(|item| BASE64.encode(item)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Vec::<String>::deserialize(deserializer)?;
        items
            .into_iter()
            .map(|s| BASE64.decode(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// `ed25519_dalek::VerifyingKey` as the base64 of its raw 32 bytes.
pub mod base64_pubkey {
    use super::*;
    use ed25519_dalek::VerifyingKey;

    pub fn serialize<S: Serializer>(key: &VerifyingKey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(key.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<VerifyingKey, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(s).map_err(serde::de::Error::custom)?;
        let raw: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("public key must be 32 bytes"))?;
        VerifyingKey::from_bytes(&raw).map_err(serde::de::Error::custom)
    }
}

/// `ed25519_dalek::Signature` as the base64 of its raw 64 bytes.
pub mod base64_signature {
    use super::*;
    use ed25519_dalek::Signature;

    pub fn serialize<S: Serializer>(sig: &Signature, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(sig.to_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Signature, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = BASE64.decode(s).map_err(serde::de::Error::custom)?;
        let raw: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))?;
        Ok(Signature::from_bytes(&raw))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "super::base64_bytes")]
        data: Vec<u8>,
        #[serde(with = "super::base64_list")]
        items: Vec<Vec<u8>>,
    }

    #[test]
    fn test_base64_roundtrip() {
        let w = Wrapper {
            data: vec![0, 1, 2, 255],
            items: vec![vec![7; 32], vec![]],
        };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), w);
    }

    #[test]
    fn test_base64_encoding_is_standard() {
        let w = Wrapper {
            data: vec![0xff, 0xfe],
            items: vec![],
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"//4=\""));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = serde_json::from_str::<Wrapper>(r#"{"data":"!!!","items":[]}"#);
        assert!(err.is_err());
    }
}
