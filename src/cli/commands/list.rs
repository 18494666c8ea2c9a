//! `shroud list`: display secret names grouped by category.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, category: Option<&str>, pattern: Option<&str>) -> Result<()> {
    let shroud = open_vault(cli)?;
    let listing = shroud.list(category, pattern)?;

    let total: usize = listing.values().map(Vec::len).sum();
    output::info(&format!(
        "{}: {total} secret(s) in {} categor{}",
        shroud.data_dir().display(),
        listing.len(),
        if listing.len() == 1 { "y" } else { "ies" }
    ));

    output::print_listing(&listing);

    Ok(())
}
