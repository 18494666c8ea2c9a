use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Shroud.
#[derive(Debug, Error)]
pub enum ShroudError {
    // --- Input errors ---
    #[error("opts.{0} is required")]
    MissingOption(&'static str),

    #[error("A secret name is required")]
    MissingName,

    #[error("A secret value is required")]
    MissingSecret,

    #[error("'{0}' is not a usable secret or category name")]
    InvalidName(String),

    #[error("Invalid list pattern: {0}")]
    InvalidPattern(String),

    // --- Vault errors ---
    #[error("A secret for {0} already exists")]
    DuplicateSecret(String),

    #[error("No secret found for {0}.")]
    SecretNotFound(String),

    #[error("No category found for {0}.")]
    CategoryNotFound(String),

    #[error("Vault at {0} has not been initialized; run `shroud init` first")]
    NotInitialized(PathBuf),

    #[error("Secret record for {0} is unreadable")]
    CorruptRecord(String),

    // --- Master key errors ---
    #[error("Invalid master password")]
    InvalidPassword,

    #[error("Vault metadata is corrupt: {0}")]
    CorruptMetadata(String),

    // --- Crypto errors ---
    #[error("Authentication failed: wrong key or tampered ciphertext")]
    AuthenticationFailed,

    #[error("Sealing failed: {0}")]
    SealFailed(String),

    #[error("Opening sealed secret failed: {0}")]
    OpenFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for Shroud results.
pub type Result<T> = std::result::Result<T, ShroudError>;
