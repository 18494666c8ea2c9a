//! The vault engine: bootstrap, add, update, remove, reveal, list.
//!
//! `Shroud` ties the metadata store, the crypto layer and the record
//! store together.  It holds no secrets itself.  A password lives only
//! for the duration of the call that needs it, and the unsealed master
//! private key is dropped (and wiped) before that call returns.
//!
//! Sealing only needs the master *public* key, so `add`, `update`,
//! `remove` and `list` never ask for the password.  Only `bootstrap`
//! and `reveal` do.
//!
//! Every operation that takes a name and no category also accepts the
//! combined `category/name` form, so `add("a/b", s, None)` and
//! `remove("a/b", None)` address the same record (`b` in category `a`).

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::asymmetric::{public_key_from_bytes, secret_key_from_bytes};
use crate::crypto::{
    derive_master_key, generate_keypair, generate_salt, open_asymmetric, open_symmetric,
    seal_asymmetric, seal_symmetric, symmetric, Argon2Params,
};
use crate::errors::{Result, ShroudError};

use super::metadata::{MasterKeyMaterial, MetadataStore};
use super::name::{display_key, split_qualified, Category, SecretName};
use super::record::SecretRecord;
use super::store::{ListScope, Listing, VaultStore};

/// Outcome of `Shroud::bootstrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// Fresh master key material was generated and persisted.
    Initialized,
    /// The vault already had master key material; nothing was written.
    AlreadyInitialized,
}

/// A vault rooted at one data directory.
#[derive(Debug, Clone)]
pub struct Shroud {
    data_dir: PathBuf,
    metadata: MetadataStore,
    store: VaultStore,
    kdf_params: Argon2Params,
}

impl Shroud {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the vault rooted at `data_dir`.
    ///
    /// Nothing is created on disk: the directory appears with the first
    /// `bootstrap` or `add`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        Ok(Self {
            metadata: MetadataStore::new(&data_dir),
            store: VaultStore::new(&data_dir),
            data_dir,
            kdf_params: Argon2Params::PINNED,
        })
    }

    /// Argon2id parameters used if this handle bootstraps the vault.
    ///
    /// Ignored for an already initialized vault: its stored parameters
    /// always win.
    pub fn with_kdf_params(mut self, params: Argon2Params) -> Self {
        self.kdf_params = params;
        self
    }

    /// Returns the vault root directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Returns `true` once master key material exists.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(MasterKeyMaterial::load(&self.metadata)?.is_some())
    }

    /// Generate and persist the master key material, once.
    ///
    /// On an initialized vault this is a no-op that never touches the
    /// existing material, whatever password is passed.
    pub fn bootstrap(&self, password: Option<&str>) -> Result<Bootstrap> {
        if self.is_initialized()? {
            debug!(dir = %self.data_dir.display(), "vault already initialized");
            return Ok(Bootstrap::AlreadyInitialized);
        }

        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(ShroudError::MissingOption("masterPassword"))?;
        self.kdf_params.validate()?;

        // 1. Derive the symmetric master key from the password.
        let master_key_salt = generate_salt();
        let master_key = derive_master_key(
            password.as_bytes(),
            &master_key_salt,
            &self.kdf_params,
            symmetric::KEY_LEN,
        )?;

        // 2. Generate the master keypair and seal its private half.
        let keypair = generate_keypair();
        let private = Zeroizing::new(keypair.secret.to_bytes());
        let nonce = symmetric::generate_nonce();
        let sealed_master_priv_key = seal_symmetric(&private[..], &nonce, &master_key)?;

        // 3. Persist all fields in one write.
        std::fs::create_dir_all(&self.data_dir)?;
        MasterKeyMaterial {
            master_key_salt: master_key_salt.to_vec(),
            master_priv_key_salt: nonce.to_vec(),
            sealed_master_priv_key,
            master_pub_key: keypair.public.as_bytes().to_vec(),
            kdf_params: self.kdf_params,
        }
        .save(&self.metadata)?;

        info!(dir = %self.data_dir.display(), kdf = %self.kdf_params, "vault initialized");
        Ok(Bootstrap::Initialized)
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Seal `secret` and store it as a new record.
    pub fn add(&self, name: &str, secret: &str, category: Option<&str>) -> Result<SecretRecord> {
        let (name, category) = parse_key(name, category)?;
        let record = self.seal(secret)?;

        self.store.add(&name, &record, category.as_ref())?;
        info!(secret = %display_key(&name, category.as_ref()), "secret added");
        Ok(record)
    }

    /// Re-seal `secret` over an existing record.
    pub fn update(&self, name: &str, secret: &str, category: Option<&str>) -> Result<SecretRecord> {
        let (name, category) = parse_key(name, category)?;
        let record = self.seal(secret)?;

        self.store.update(&name, &record, category.as_ref())?;
        info!(secret = %display_key(&name, category.as_ref()), "secret updated");
        Ok(record)
    }

    /// Delete a record.
    pub fn remove(&self, name: &str, category: Option<&str>) -> Result<()> {
        let (name, category) = parse_key(name, category)?;

        self.store.remove(&name, category.as_ref())?;
        info!(secret = %display_key(&name, category.as_ref()), "secret removed");
        Ok(())
    }

    /// Returns `true` if a record exists.  No decryption is performed.
    pub fn contains(&self, name: &str, category: Option<&str>) -> Result<bool> {
        let (name, category) = parse_key(name, category)?;
        Ok(self.store.contains(&name, category.as_ref()))
    }

    /// Decrypt and return a secret.
    ///
    /// A missing record is reported before the password is checked.
    /// A wrong password is `InvalidPassword`; a record that cannot be
    /// opened with the right password is `OpenFailed`.
    pub fn reveal(
        &self,
        password: &str,
        name: &str,
        category: Option<&str>,
    ) -> Result<Zeroizing<String>> {
        let (name, category) = parse_key(name, category)?;
        let key = display_key(&name, category.as_ref());

        let record = self.store.get(&name, category.as_ref())?;
        let material = self.material()?;

        // Unseal the master private key; authentication failure here
        // can only mean the password is wrong.
        let master_key = derive_master_key(
            password.as_bytes(),
            &material.master_key_salt,
            &material.kdf_params,
            symmetric::KEY_LEN,
        )?;
        let private_bytes = open_symmetric(
            &material.sealed_master_priv_key,
            &material.master_priv_key_salt,
            &master_key,
        )
        .map_err(|e| match e {
            ShroudError::AuthenticationFailed => ShroudError::InvalidPassword,
            ShroudError::OpenFailed(detail) => ShroudError::CorruptMetadata(detail),
            other => other,
        })?;

        let private = secret_key_from_bytes(&private_bytes).ok_or_else(|| {
            ShroudError::CorruptMetadata("master private key has the wrong length".into())
        })?;
        if private.public_key().as_bytes()[..] != material.master_pub_key[..] {
            return Err(ShroudError::CorruptMetadata(
                "master public key does not match the private key".into(),
            ));
        }

        // Open the record itself.
        let sender = public_key_from_bytes(&record.pubkey)
            .ok_or_else(|| ShroudError::OpenFailed(format!("{key}: malformed pubkey")))?;
        let plaintext = open_asymmetric(&record.sealed_secret, &sender, &record.salt, &private)
            .map_err(|e| match e {
                ShroudError::OpenFailed(detail) => ShroudError::OpenFailed(format!("{key}: {detail}")),
                other => other,
            })?;

        let text = std::str::from_utf8(&plaintext)
            .map_err(|_| ShroudError::OpenFailed(format!("{key}: payload is not UTF-8")))?;

        debug!(secret = %key, "secret revealed");
        Ok(Zeroizing::new(text.to_owned()))
    }

    /// List secret names per category, optionally filtered by pattern.
    pub fn list(&self, category: Option<&str>, pattern: Option<&str>) -> Result<Listing> {
        let scope = match category.map(str::trim).filter(|c| !c.is_empty()) {
            None => ListScope::Everything,
            Some(raw) => match Category::parse(Some(raw))? {
                Some(c) => ListScope::Category(c),
                None => ListScope::Uncategorized,
            },
        };
        self.store.list(&scope, pattern)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn material(&self) -> Result<MasterKeyMaterial> {
        MasterKeyMaterial::load(&self.metadata)?
            .ok_or_else(|| ShroudError::NotInitialized(self.data_dir.clone()))
    }

    /// Seal a payload towards the master public key.
    fn seal(&self, secret: &str) -> Result<SecretRecord> {
        if secret.is_empty() {
            return Err(ShroudError::MissingSecret);
        }

        let material = self.material()?;
        let master_pub = public_key_from_bytes(&material.master_pub_key).ok_or_else(|| {
            ShroudError::CorruptMetadata("masterPubKey is not a 32-byte key".into())
        })?;

        Ok(seal_asymmetric(secret.as_bytes(), &master_pub, None, None)?.into())
    }
}

/// Sanitize a `(name, category)` pair.  Without a category, a
/// `category/name` name is split on its first `/`.
fn parse_key(name: &str, category: Option<&str>) -> Result<(SecretName, Option<Category>)> {
    let (category, name) = match category {
        Some(c) => (Some(c), name),
        None => split_qualified(name),
    };
    Ok((SecretName::parse(Some(name))?, Category::parse(category)?))
}
