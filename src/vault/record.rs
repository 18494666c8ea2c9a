//! The on-disk secret record.
//!
//! Each secret file holds one JSON object:
//!
//! ```text
//! {"sealedSecret":"<base64>","pubkey":"<base64>","salt":"<base64>"}
//! ```
//!
//! - **sealedSecret**: box ciphertext of the secret payload.
//! - **pubkey**: the ephemeral public key the payload was sealed with.
//! - **salt**: the 24-byte box nonce.
//!
//! A record is self-contained: the master private key plus these three
//! fields are enough to open it.

use serde::{Deserialize, Serialize};

use crate::crypto::Sealed;

/// A single sealed secret as stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub sealed_secret: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub pubkey: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,
}

impl From<Sealed> for SecretRecord {
    fn from(sealed: Sealed) -> Self {
        Self {
            sealed_secret: sealed.ciphertext,
            pubkey: sealed.sender_public.as_bytes().to_vec(),
            salt: sealed.nonce,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
