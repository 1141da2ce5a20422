//! Root CLI structure for sparkler-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sparkler-rs")]
#[command(about = "Run and inspect sparkler burn simulations", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Burn a sparkler headlessly and report on it
    Simulate(crate::commands::simulate::SimulateArgs),

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: crate::commands::config::ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
