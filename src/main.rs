//! Varispeed CLI - Pitch and Tempo Player
//!
//! Command-line interface for the Varispeed playback controller.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use varispeed::cli::commands::{self, PlayOptions};
use varispeed::cli::{Cli, Commands};
use varispeed::PlayerConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PlayerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PlayerConfig::default(),
    };

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Varispeed v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("Varispeed v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &PlayerConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Play {
            paths,
            pitch,
            tempo,
            seek,
            seconds,
            json,
        } => {
            let options = PlayOptions {
                pitch,
                tempo,
                seek,
                seconds,
                json,
            };
            commands::play(&paths, &options, config)
        }
        Commands::Inspect { path } => commands::inspect(&path),
    }
}
