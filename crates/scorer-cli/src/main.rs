//! Label Scorer
//!
//! Assigns free-text activity descriptions to user-defined labels by
//! semantic similarity, learning new examples as they are confirmed.
//!
//! # Usage
//!
//! ```bash
//! label-scorer predict "writing code"
//! label-scorer update Work "writing code"
//! label-scorer show Work
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/label-scorer/config.toml)
//! 3. Environment variables (SCORER_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use scorer_cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
