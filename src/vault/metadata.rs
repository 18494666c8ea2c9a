//! The metadata store: a flat JSON mapping persisted next to the secrets.
//!
//! It holds the master key material written once at bootstrap.  Writes
//! are read-merge-write through a temp file and a rename, so a reader
//! never sees a half-written file.  There is no locking: two processes
//! updating at once race and the last writer wins.  Shroud assumes a
//! single writer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::{asymmetric, symmetric, Argon2Params};
use crate::errors::{Result, ShroudError};

use super::store::write_atomic;

/// File name of the metadata store inside the vault root.
///
/// The leading dot keeps it out of the secret namespace: sanitized
/// names never start with one.
pub const METADATA_FILE: &str = ".metadata.json";

const MASTER_KEY_SALT: &str = "masterKeySalt";
const MASTER_PRIV_KEY_SALT: &str = "masterPrivKeySalt";
const SEALED_MASTER_PRIV_KEY: &str = "sealedMasterPrivKey";
const MASTER_PUB_KEY: &str = "masterPubKey";
const KDF_PARAMS: &str = "kdfParams";

/// Argon2 refuses salts shorter than this.
const MIN_SALT_LEN: usize = 8;

/// A 32-byte private key plus the 16-byte AES-GCM tag.
const SEALED_PRIV_KEY_LEN: usize = asymmetric::KEY_LEN + 16;

/// Handle on `<root>/.metadata.json`.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(METADATA_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping.  A missing file reads as empty.
    pub fn read(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&contents)
            .map_err(|e| ShroudError::CorruptMetadata(format!("{}: {e}", self.path.display())))
    }

    /// Value of a single key, if present.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    /// Merge `entries` into the persisted mapping, leaving other keys
    /// untouched.
    pub fn update<I, K, V>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut data = self.read()?;
        data.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));

        let bytes = serde_json::to_vec_pretty(&data)
            .map_err(|e| ShroudError::SerializationError(format!("metadata: {e}")))?;
        write_atomic(&self.path, &bytes)
    }
}

/// The vault's master key material.
///
/// Created once at bootstrap and never changed afterwards.  The four
/// key fields exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterKeyMaterial {
    /// Salt fed to Argon2id together with the password.
    pub master_key_salt: Vec<u8>,
    /// AES-GCM nonce used to seal the master private key.
    pub master_priv_key_salt: Vec<u8>,
    /// The master private key, sealed under the password-derived key.
    pub sealed_master_priv_key: Vec<u8>,
    /// The master public key, in the clear.
    pub master_pub_key: Vec<u8>,
    /// Argon2id parameters the master key was derived with.
    pub kdf_params: Argon2Params,
}

impl MasterKeyMaterial {
    /// Load the material from `store`.
    ///
    /// Returns `Ok(None)` for an uninitialized vault and
    /// `CorruptMetadata` when only some of the fields are present.
    pub fn load(store: &MetadataStore) -> Result<Option<Self>> {
        let data = store.read()?;
        let fields = [
            MASTER_KEY_SALT,
            MASTER_PRIV_KEY_SALT,
            SEALED_MASTER_PRIV_KEY,
            MASTER_PUB_KEY,
        ];

        let present = fields.iter().filter(|k| data.contains_key(**k)).count();
        if present == 0 {
            return Ok(None);
        }
        if present != fields.len() {
            let missing: Vec<&str> = fields
                .iter()
                .copied()
                .filter(|k| !data.contains_key(*k))
                .collect();
            return Err(ShroudError::CorruptMetadata(format!(
                "incomplete master key material, missing {}",
                missing.join(", ")
            )));
        }

        let decode = |key: &str| -> Result<Vec<u8>> {
            let value = data.get(key).map(String::as_str).unwrap_or_default();
            BASE64
                .decode(value)
                .map_err(|e| ShroudError::CorruptMetadata(format!("{key} is not base64: {e}")))
        };

        let kdf_params: Argon2Params = match data.get(KDF_PARAMS) {
            Some(text) => text.parse()?,
            None => Argon2Params::PINNED,
        };
        // Stored params below the floor were never written by bootstrap.
        kdf_params
            .validate()
            .map_err(|e| ShroudError::CorruptMetadata(format!("{KDF_PARAMS}: {e}")))?;

        let material = Self {
            master_key_salt: decode(MASTER_KEY_SALT)?,
            master_priv_key_salt: decode(MASTER_PRIV_KEY_SALT)?,
            sealed_master_priv_key: decode(SEALED_MASTER_PRIV_KEY)?,
            master_pub_key: decode(MASTER_PUB_KEY)?,
            kdf_params,
        };
        material.check_lengths()?;
        Ok(Some(material))
    }

    /// Reject fields whose sizes no bootstrap could have produced, so
    /// damaged metadata is never mistaken for a wrong password.
    fn check_lengths(&self) -> Result<()> {
        let checks = [
            (
                MASTER_KEY_SALT,
                self.master_key_salt.len() >= MIN_SALT_LEN,
                format!("at least {MIN_SALT_LEN} bytes"),
            ),
            (
                MASTER_PRIV_KEY_SALT,
                self.master_priv_key_salt.len() == symmetric::NONCE_LEN,
                format!("{} bytes", symmetric::NONCE_LEN),
            ),
            (
                SEALED_MASTER_PRIV_KEY,
                self.sealed_master_priv_key.len() == SEALED_PRIV_KEY_LEN,
                format!("{SEALED_PRIV_KEY_LEN} bytes"),
            ),
            (
                MASTER_PUB_KEY,
                self.master_pub_key.len() == asymmetric::KEY_LEN,
                format!("{} bytes", asymmetric::KEY_LEN),
            ),
        ];

        for (key, ok, expected) in checks {
            if !ok {
                return Err(ShroudError::CorruptMetadata(format!(
                    "{key} must be {expected}"
                )));
            }
        }
        Ok(())
    }

    /// Persist every field in a single metadata write.
    pub fn save(&self, store: &MetadataStore) -> Result<()> {
        store.update([
            (MASTER_KEY_SALT, BASE64.encode(&self.master_key_salt)),
            (MASTER_PRIV_KEY_SALT, BASE64.encode(&self.master_priv_key_salt)),
            (
                SEALED_MASTER_PRIV_KEY,
                BASE64.encode(&self.sealed_master_priv_key),
            ),
            (MASTER_PUB_KEY, BASE64.encode(&self.master_pub_key)),
            (KDF_PARAMS, self.kdf_params.to_string()),
        ])
    }
}
