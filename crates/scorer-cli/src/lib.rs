//! Label scorer command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (predict, update, create, show, labels)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{format_scores, run};
