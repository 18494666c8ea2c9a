//! Password-based key derivation using Argon2id.
//!
//! The cost parameters are pinned, never auto-calibrated: a vault is
//! bootstrapped with an explicit `Argon2Params` value, that value is
//! persisted next to the master key material, and every later
//! derivation reads it back.  The same password + salt + params always
//! yields the same key on any host.

use std::fmt;
use std::str::FromStr;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::errors::{Result, ShroudError};

/// Length of the master key salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Argon2Params {
    /// The pinned parameters used when a vault has no stored params.
    pub const PINNED: Self = Self {
        memory_kib: 65_536,
        iterations: 3,
        parallelism: 4,
    };

    /// Reject parameters below the safety floor.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(ShroudError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(ShroudError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(ShroudError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self::PINNED
    }
}

/// Text form stored in the metadata file: `m=65536,t=3,p=4`.
impl fmt::Display for Argon2Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={},t={},p={}",
            self.memory_kib, self.iterations, self.parallelism
        )
    }
}

impl FromStr for Argon2Params {
    type Err = ShroudError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ShroudError::CorruptMetadata(format!("malformed kdf params '{s}'"));

        let (mut m, mut t, mut p) = (None, None, None);
        for part in s.split(',') {
            let (key, value) = part.trim().split_once('=').ok_or_else(bad)?;
            let value: u32 = value.parse().map_err(|_| bad())?;
            match key {
                "m" => m = Some(value),
                "t" => t = Some(value),
                "p" => p = Some(value),
                _ => return Err(bad()),
            }
        }

        Ok(Self {
            memory_kib: m.ok_or_else(bad)?,
            iterations: t.ok_or_else(bad)?,
            parallelism: p.ok_or_else(bad)?,
        })
    }
}

/// Derive an `output_len`-byte master key from a password and salt.
///
/// The returned buffer is wiped when dropped.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    argon2_params.validate()?;

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(output_len),
    )
    .map_err(|e| ShroudError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new(vec![0u8; output_len]);
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| ShroudError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
