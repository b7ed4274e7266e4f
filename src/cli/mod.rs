//! CLI interface for sfxsynth

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Procedural sound effects from waveform synthesis
#[derive(Parser)]
#[command(name = "sfxsynth")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play an effect on the output device
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "sfx.yaml")]
        config: PathBuf,

        /// Effect name
        #[arg(short, long)]
        effect: String,
    },

    /// Render an effect to a WAV file
    Render {
        /// Configuration file path
        #[arg(short, long, default_value = "sfx.yaml")]
        config: PathBuf,

        /// Effect name
        #[arg(short, long)]
        effect: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List the effects in a configuration file
    List {
        /// Configuration file path
        #[arg(short, long, default_value = "sfx.yaml")]
        config: PathBuf,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "sfx.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
