//! Chorus CLI - Compare generative-model outputs side by side.
//!
//! Chorus sends one prompt to several model backends and collects their
//! outputs into a single comparison: image files on disk for image models,
//! a side-by-side report for text models.
//!
//! # Usage
//!
//! ```bash
//! # Compare two image models
//! chorus compare "a red fox in snow" --modality image -p titan -p stability
//!
//! # Compare text models, JSON output
//! chorus compare "explain quantum entanglement" -p openai -p anthropic --format json
//!
//! # View configuration
//! chorus config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Chorus - Compare generative-model outputs side by side.
#[derive(Parser, Debug)]
#[command(name = "chorus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one prompt to several providers and compare the results
    Compare(cli::compare::CompareArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match chorus_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `chorus config path`."
            );
            chorus_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Chorus v{}", chorus_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Compare(args) => cli::compare::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
