//! Developer tool for rulesets.
//!
//! Loads a ruleset directory the way a server would, then reports what the
//! upgrader changed or answers single action queries against a snapshot.
//! Run with: `cargo run -p rulecheck -- <command>`

mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Enablers, Query};

/// Ruleset checks and action queries
#[derive(Parser)]
#[command(name = "rulecheck")]
#[command(about = "Load, upgrade and query action rulesets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load, upgrade and sanity check a ruleset; print the warnings
    Check(Check),

    /// Legality and probability of one action in a world snapshot
    Query(Query),

    /// Dump the enabler store after the upgrade
    Enablers(Enablers),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check(cmd) => cmd.execute(),
        Command::Query(cmd) => cmd.execute(),
        Command::Enablers(cmd) => cmd.execute(),
    }
}
