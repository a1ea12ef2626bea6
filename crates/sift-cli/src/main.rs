//! Sift CLI - filter delimited data and reconcile edits against the view.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Profile {
            file,
            json,
            declare,
        } => commands::profile::run(file, json, declare, cli.verbose),

        Commands::Filter {
            file,
            filters,
            json,
            limit,
            declare,
        } => commands::filter::run(file, filters, json, limit, declare, cli.verbose),

        Commands::Edit {
            file,
            filters,
            edits,
            output,
            format,
            json,
            declare,
        } => commands::edit::run(
            file,
            filters,
            edits,
            output,
            format,
            json,
            declare,
            cli.verbose,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default = if verbose { "sift=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
