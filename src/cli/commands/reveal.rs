//! `shroud reveal`: decrypt and print a single secret's value.

use crate::cli::output;
use crate::cli::{open_initialized_vault, prompt_password, secret_key, Cli};
use crate::errors::{Result, ShroudError};

/// Execute the `reveal` command.
pub fn execute(cli: &Cli, name: &str, category: Option<&str>) -> Result<()> {
    let (category, name) = secret_key(name, category);
    let shroud = open_initialized_vault(cli)?;

    // Don't ask for a password for a secret that isn't there.
    if !shroud.contains(name, category)? {
        return Err(ShroudError::SecretNotFound(name.to_string()));
    }

    let password = prompt_password()?;
    let value = shroud.reveal(&password, name, category)?;

    output::secret(&value);

    Ok(())
}
