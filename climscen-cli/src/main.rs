mod cli;
mod commands;
mod context;
mod error;
mod selection;

use clap::Parser;
use cli::{Cli, Commands};
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // Default is "warn" so rejected drive tokens still reach the terminal.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    let conn = context::connect(cli.config.as_deref(), cli.data_dir.as_deref()).await?;

    let result = match cli.command {
        Commands::Projects { long } => commands::projects::run(&conn, long).await,
        Commands::Files { project, pattern } => {
            commands::files::run(&conn, &project, &pattern).await
        }
        Commands::Resolve {
            project,
            selection,
            json,
        } => commands::resolve::run(&conn, &project, &selection, json).await,
        Commands::Path { project, selection } => {
            commands::path::run(&conn, &project, &selection).await
        }
    };

    context::report_auth_failures(&conn);
    result
}
