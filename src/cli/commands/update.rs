//! `shroud update`: re-seal an existing secret with a new value.

use crate::cli::output;
use crate::cli::{open_initialized_vault, read_secret_value, secret_key, Cli};
use crate::errors::{Result, ShroudError};

/// Execute the `update` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>, category: Option<&str>) -> Result<()> {
    let (category, name) = secret_key(name, category);
    let shroud = open_initialized_vault(cli)?;

    if !shroud.contains(name, category)? {
        output::tip("Use `shroud add` to create it.");
        return Err(ShroudError::SecretNotFound(name.to_string()));
    }

    let secret_value = read_secret_value(name, value)?;
    shroud.update(name, &secret_value, category)?;

    output::success(&format!("Secret '{name}' updated"));
    Ok(())
}
