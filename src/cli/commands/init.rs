//! `shroud init`: bootstrap the vault's master key material.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, Cli};
use crate::errors::Result;
use crate::vault::Bootstrap;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let shroud = open_vault(cli)?;
    let dir = shroud.data_dir().display().to_string();

    // 1. Never prompt for (or overwrite) an existing master password.
    if shroud.is_initialized()? {
        output::info(&format!("Vault at {dir} is already initialized."));
        output::tip("Use `shroud add <NAME>` to add secrets to it.");
        return Ok(());
    }

    // 2. Prompt for a new password (with confirmation).
    let password = prompt_new_password()?;

    // 3. Generate and persist the master key material.
    match shroud.bootstrap(Some(password.as_str()))? {
        Bootstrap::Initialized => output::success(&format!("Vault created at {dir}")),
        Bootstrap::AlreadyInitialized => {
            output::info(&format!("Vault at {dir} is already initialized."))
        }
    }

    // 4. Show helpful tips.
    output::tip("Run `shroud add <NAME>` to add a secret.");
    output::tip("Run `shroud list` to see all secrets.");
    output::tip("Run `shroud reveal <NAME>` to decrypt one.");

    Ok(())
}
