//! CLI definitions for Tabweaver.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tabweaver CLI.
#[derive(Parser)]
#[command(name = "tabweaver")]
#[command(about = "AI-named tab grouping engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "tabweaver.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Replay a grouping run against a tab snapshot
    Group {
        /// JSON tab snapshot
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Cancel at the preview instead of confirming
        #[arg(long)]
        cancel: bool,

        /// File holding the language model's raw reply
        #[arg(long)]
        model_response: Option<PathBuf>,

        /// Behave as if no on-device model exists
        #[arg(long)]
        model_unavailable: bool,
    },

    /// Show the domain groups a snapshot would produce
    Preview {
        /// JSON tab snapshot
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Validate the configuration file
    CheckConfig,
}
