use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{Result, ShroudError};

/// User-level configuration, loaded from `<config dir>/shroud/config.toml`.
///
/// Every field has a sensible default so Shroud works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault root directory (default: `~/.shroud`).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    Argon2Params::PINNED.memory_kib
}

fn default_argon2_iterations() -> u32 {
    Argon2Params::PINNED.iterations
}

fn default_argon2_parallelism() -> u32 {
    Argon2Params::PINNED.parallelism
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file inside the config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Name of the vault directory created under the home directory.
    const DEFAULT_VAULT_DIR: &'static str = ".shroud";

    /// Load settings from the per-user config directory.
    pub fn load_default() -> Result<Self> {
        match dirs::config_dir() {
            Some(dir) => Self::load(&dir.join("shroud")),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from `<config_dir>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ShroudError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the vault root: explicit override, then the configured
    /// `data_dir`, then `~/.shroud`.
    pub fn resolve_data_dir(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = explicit.or(self.data_dir.as_deref()) {
            return Ok(dir.to_path_buf());
        }

        dirs::home_dir()
            .map(|home| home.join(Self::DEFAULT_VAULT_DIR))
            .ok_or_else(|| {
                ShroudError::ConfigError(
                    "cannot determine home directory; pass --data-dir".into(),
                )
            })
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
