//! Neato - sign in to the Neato robot cloud from the command line.
//!
//! Main entry point for the Neato CLI.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth, config};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Neato - sign in to the Neato robot cloud
#[derive(Parser)]
#[command(name = "neato")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Config directory (default: platform config dir + /neato)
    #[arg(long, global = true, env = "NEATO_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out and inspect the stored token
    Auth(auth::AuthArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => neato_config::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
    };

    // Initialize tracing — console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "neato=debug,neato_auth=debug,neato_config=debug,info"
    } else {
        "neato=info,neato_auth=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily(config_dir.join("logs"), "neato.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "neato=trace,neato_auth=trace,neato_config=trace,info",
                )),
        )
        .init();

    let loaded = neato_config::load_config_with_options(None, Some(config_dir.as_path()))?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let sources = loaded
        .loaded_from()
        .into_iter()
        .map(Path::to_path_buf)
        .collect();
    let ctx = commands::Context {
        config: loaded.config,
        sources,
        config_dir,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
