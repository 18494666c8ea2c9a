//! One module per subcommand; each exposes an `execute` function.

pub mod add;
pub mod completions;
pub mod init;
pub mod list;
pub mod remove;
pub mod reveal;
pub mod update;
