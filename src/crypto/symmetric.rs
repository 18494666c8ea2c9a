//! AES-256-GCM authenticated encryption with a caller-supplied nonce.
//!
//! Used for one thing only: sealing the master private key under the
//! password-derived master key.  The nonce is stored separately in the
//! metadata file (`masterPrivKeySalt`), so unlike a blob format the
//! ciphertext here is just `ciphertext || 16-byte tag`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, ShroudError};

/// Size of the symmetric key in bytes.
pub const KEY_LEN: usize = 32;

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Generate a fresh random nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt and authenticate `plaintext` under `key` with `nonce`.
pub fn seal_symmetric(plaintext: &[u8], nonce: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(ShroudError::SealFailed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ShroudError::SealFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| ShroudError::SealFailed(format!("encryption error: {e}")))
}

/// Verify and decrypt data produced by `seal_symmetric`.
///
/// A wrong key, a wrong nonce or a flipped bit surfaces as
/// `AuthenticationFailed`; callers use that as the wrong-password
/// signal.  A nonce or key of the wrong size is malformed input, not an
/// authentication failure, and is reported as `OpenFailed`.
pub fn open_symmetric(ciphertext: &[u8], nonce: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(ShroudError::OpenFailed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ShroudError::OpenFailed(format!("invalid key length: {e}")))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| ShroudError::AuthenticationFailed)?;

    Ok(Zeroizing::new(plaintext))
}
