//! Command-line interface for squares.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Squares - match engine with an external move oracle
#[derive(Parser, Debug)]
#[command(name = "squares")]
#[command(about = "Play Squares against people or a move oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "squares.toml")]
    pub config: PathBuf,

    /// Oracle endpoint, overriding the config file and environment
    #[arg(long, global = true)]
    pub oracle_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively on the console (GAME / MOVE / RESET / HELP / EXIT)
    Play {
        /// Never contact the oracle; oracle sides play random moves
        #[arg(long)]
        offline: bool,

        /// Apply oracle moves without the pacing delay
        #[arg(long)]
        no_delay: bool,

        /// Seed for fallback moves (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Ask the oracle for a move on an empty board and print the answer
    Probe {
        /// Board size to send
        #[arg(short, long, default_value = "5")]
        size: usize,
    },
}
