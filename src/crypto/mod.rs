//! Cryptographic primitives for Shroud.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM sealing of the master private key (`symmetric`)
//! - X25519 box sealing of individual secrets (`asymmetric`)

pub mod asymmetric;
pub mod kdf;
pub mod symmetric;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal_asymmetric, open_symmetric, ...};
pub use asymmetric::{generate_keypair, open_asymmetric, seal_asymmetric, Keypair, Sealed};
pub use kdf::{derive_master_key, generate_salt, Argon2Params};
pub use symmetric::{open_symmetric, seal_symmetric};
