// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log filter: RUST_LOG when set, otherwise derived from -v
fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::new(level)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Neededby {
            pkgnames,
            policy,
            repo,
            output,
        } => commands::cmd_neededby(&pkgnames, &policy, &repo, &output),

        Commands::Getsourcerpm {
            pkgnames,
            full_name,
            repo,
        } => commands::cmd_getsourcerpm(&pkgnames, full_name, &repo),

        Commands::Neededtoselfhost {
            pkgnames,
            policy,
            repo,
            output,
        } => commands::cmd_neededtoselfhost(&pkgnames, &policy, &repo, &output),

        Commands::Resolve {
            pkgnames,
            selfhost,
            ignore_requirement,
            hint,
            recommends,
            repo,
            output,
        } => commands::cmd_resolve(
            &pkgnames,
            selfhost,
            &ignore_requirement,
            &hint,
            recommends,
            &repo,
            &output,
        ),
    }
}
