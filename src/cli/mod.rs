//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, ShroudError};
use crate::vault::{split_qualified, Shroud};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the password.
const PASSWORD_ENV: &str = "SHROUD_PASSWORD";

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "SHROUD_LOG";

/// Shroud CLI: local encrypted secret vault.
#[derive(Parser)]
#[command(name = "shroud", about = "Local encrypted secret vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: ~/.shroud)
    #[arg(long, env = "SHROUD_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize the vault and its master password
    Init,

    /// Add a new secret
    Add {
        /// Secret name, optionally as category/name
        name: String,
        /// Secret value (omit for interactive prompt)
        value: Option<String>,
        /// Category to file the secret under
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Replace the value of an existing secret
    Update {
        /// Secret name, optionally as category/name
        name: String,
        /// New secret value (omit for interactive prompt)
        value: Option<String>,
        /// Category the secret is filed under
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Remove a secret
    Remove {
        /// Secret name, optionally as category/name
        name: String,
        /// Category the secret is filed under
        #[arg(short, long)]
        category: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt and print a secret
    Reveal {
        /// Secret name, optionally as category/name
        name: String,
        /// Category the secret is filed under
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List secret names by category
    List {
        /// Only list this category
        category: Option<String>,
        /// Case-insensitive regex to filter names
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber.
///
/// `SHROUD_LOG` takes a full filter directive; otherwise only warnings
/// are shown, or debug output with `--verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("shroud={level}")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Open the vault selected by `--data-dir` / config / default.
///
/// The configured Argon2 params apply only if this vault gets
/// bootstrapped.
pub fn open_vault(cli: &Cli) -> Result<Shroud> {
    let settings = Settings::load_default()?;
    let data_dir = settings.resolve_data_dir(cli.data_dir.as_deref())?;
    Ok(Shroud::open(data_dir)?.with_kdf_params(settings.argon2_params()))
}

/// Open the vault and fail early if it was never initialized.
pub fn open_initialized_vault(cli: &Cli) -> Result<Shroud> {
    let shroud = open_vault(cli)?;
    if !shroud.is_initialized()? {
        output::tip("Run `shroud init` to create the vault.");
        return Err(ShroudError::NotInitialized(shroud.data_dir().to_path_buf()));
    }
    Ok(shroud)
}

/// Resolve `(category, name)` from the CLI arguments.
///
/// An explicit `--category` wins; otherwise `category/name` is split.
pub fn secret_key<'a>(name: &'a str, category: Option<&'a str>) -> (Option<&'a str>, &'a str) {
    match category {
        Some(c) => (Some(c), name),
        None => split_qualified(name),
    }
}

/// Determine a secret value from one of three sources.
pub fn read_secret_value(name: &str, value: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = value {
        // Source 1: Inline value on the command line.
        output::warning("Value provided on command line; it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    // Source 3: Interactive secure prompt (default).
    let v = dialoguer::Password::new()
        .with_prompt(format!("Enter value for {name}"))
        .interact()
        .map_err(|e| ShroudError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(v))
}

/// Get the master password, trying in order:
/// 1. `SHROUD_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| ShroudError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used by `init`).
///
/// Also respects `SHROUD_PASSWORD` and enforces a minimum length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(ShroudError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| ShroudError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}
