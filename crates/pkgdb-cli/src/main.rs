//! pkgdb - installed-package registry CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkgdb_cli::cmd;
use pkgdb_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Commands::List => cmd::list::list(&cli.source, json),
        Commands::Name { name } => cmd::info::info(&cli.source, &name, json),
        Commands::Uid { uid, all } => cmd::uid::uid(&cli.source, &uid, all, json),
        Commands::Status => cmd::status::status(&cli.source, json),
    }
}
