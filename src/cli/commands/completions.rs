//! `shroud completions`: print a shell completion script.
//!
//!   shroud completions bash > ~/.local/share/bash-completion/completions/shroud
//!   shroud completions zsh > "${fpath[1]}/_shroud"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let mut stdout = io::stdout().lock();
    generate(shell, &mut cmd, "shroud", &mut stdout);
    stdout.flush()?;
    Ok(())
}
