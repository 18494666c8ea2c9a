//! `shroud remove`: delete a secret from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_initialized_vault, secret_key, Cli};
use crate::errors::{Result, ShroudError};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, name: &str, category: Option<&str>, force: bool) -> Result<()> {
    let (category, name) = secret_key(name, category);
    let shroud = open_initialized_vault(cli)?;

    if !shroud.contains(name, category)? {
        return Err(ShroudError::SecretNotFound(name.to_string()));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove secret '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| ShroudError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    shroud.remove(name, category)?;
    output::success(&format!("Removed secret '{name}'"));

    Ok(())
}
