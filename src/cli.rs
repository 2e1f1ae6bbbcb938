//! Command-line interface for tictactoe_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe sessions between random and LLM-backed players
#[derive(Parser, Debug)]
#[command(name = "tictactoe_arena")]
#[command(about = "Tic-tac-toe sessions with LLM players and decision logging", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Http {
        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory for move/game log files
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,
    },

    /// Play games to completion locally and print the outcomes
    Play {
        /// Number of games to play
        #[arg(short, long, default_value = "1")]
        games: u32,

        /// Path to a match configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory for move/game log files
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,
    },
}
