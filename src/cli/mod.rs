//! CLI interface for coinwatch
//!
//! Subcommands:
//! - `run`: start the aggregation service
//! - `config`: print the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coinwatch")]
#[command(about = "Live cryptocurrency price aggregation service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the aggregation service
    Run(RunArgs),
    /// Print the effective configuration
    Config,
}
