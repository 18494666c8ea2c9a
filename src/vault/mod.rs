//! Vault module: sealed secret storage.
//!
//! This module provides:
//! - Secret and category name sanitization (`name`)
//! - The `SecretRecord` file format (`record`)
//! - The master key metadata store (`metadata`)
//! - The on-disk record store with category listing (`store`)
//! - The `Shroud` engine that ties them together (`engine`)

pub mod engine;
pub mod metadata;
pub mod name;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use engine::{Bootstrap, Shroud};
pub use metadata::{MasterKeyMaterial, MetadataStore};
pub use name::{split_qualified, Category, SecretName, UNCATEGORIZED};
pub use record::SecretRecord;
pub use store::{ListScope, Listing, VaultStore};
