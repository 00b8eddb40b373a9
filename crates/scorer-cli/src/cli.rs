//! CLI argument parsing for the label scorer.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Label Scorer
///
/// Classifies short activity descriptions into user-defined labels.
#[derive(Parser, Debug)]
#[command(name = "label-scorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/label-scorer/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override snapshot file path
    #[arg(long, global = true)]
    pub snapshot: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Scorer commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank labels for a piece of text
    Predict {
        /// Text to classify
        text: String,

        /// Show only the best N labels
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a description to a label, creating the label if needed
    Update {
        /// Label to update
        label: String,

        /// Example description
        description: String,
    },

    /// Create a label with no descriptions
    Create {
        /// Label to create
        label: String,
    },

    /// Show a label's descriptions
    Show {
        /// Label to show
        label: String,
    },

    /// List all labels
    Labels,
}
