use clap::Parser;
use shroud::cli::{commands, init_tracing, output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::Add {
            ref name,
            ref value,
            ref category,
        } => commands::add::execute(&cli, name, value.as_deref(), category.as_deref()),
        Commands::Update {
            ref name,
            ref value,
            ref category,
        } => commands::update::execute(&cli, name, value.as_deref(), category.as_deref()),
        Commands::Remove {
            ref name,
            ref category,
            force,
        } => commands::remove::execute(&cli, name, category.as_deref(), force),
        Commands::Reveal {
            ref name,
            ref category,
        } => commands::reveal::execute(&cli, name, category.as_deref()),
        Commands::List {
            ref category,
            ref pattern,
        } => commands::list::execute(&cli, category.as_deref(), pattern.as_deref()),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
