//! `shroud add`: seal a new secret into the vault.

use crate::cli::output;
use crate::cli::{open_initialized_vault, read_secret_value, secret_key, Cli};
use crate::errors::{Result, ShroudError};

/// Execute the `add` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>, category: Option<&str>) -> Result<()> {
    let (category, name) = secret_key(name, category);
    let shroud = open_initialized_vault(cli)?;

    // Fail before prompting for a value; the store still makes the
    // final call.
    if shroud.contains(name, category)? {
        output::tip("Use `shroud update` to replace its value.");
        return Err(ShroudError::DuplicateSecret(name.to_string()));
    }

    let secret_value = read_secret_value(name, value)?;
    shroud.add(name, &secret_value, category)?;

    match category {
        Some(c) if !c.trim().is_empty() => {
            output::success(&format!("Secret '{name}' added to category '{c}'"))
        }
        _ => output::success(&format!("Secret '{name}' added")),
    }
    output::tip("Run `shroud reveal <NAME>` to read it back.");

    Ok(())
}
