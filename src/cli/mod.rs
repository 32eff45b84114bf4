//! CLI Module
//!
//! Headless command-line front end for the Varispeed player.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Varispeed - play audio with live pitch and tempo control
#[derive(Parser, Debug)]
#[command(name = "varispeed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import files into a playlist and play the last one
    #[command(name = "play")]
    Play {
        /// WAV files or directories to import
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Pitch shift in semitones (-12 to 12)
        #[arg(long, allow_hyphen_values = true)]
        pitch: Option<i32>,

        /// Tempo ratio (0.5 to 2.0)
        #[arg(long)]
        tempo: Option<f64>,

        /// Start position as a fraction of the track (0.0 to 1.0)
        #[arg(long)]
        seek: Option<f64>,

        /// How long to play, in seconds
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,

        /// Print the player view as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print format details of an audio file
    #[command(name = "inspect")]
    Inspect {
        /// Path to the audio file
        path: PathBuf,
    },
}
