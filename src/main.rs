//! Tictactoe Arena - Unified CLI
//!
//! Runs the HTTP game server or plays games to completion locally.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tictactoe_arena::{
    Cli, Command, GameSink, JsonlGameSink, MatchConfig, SessionManager,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Http {
            port,
            host,
            log_dir,
        } => run_http(host, port, &log_dir).await,
        Command::Play {
            games,
            config,
            log_dir,
        } => run_play(games, config.as_deref(), &log_dir).await,
    }
}

/// Opens the JSONL sink, degrading to no logging on failure.
fn open_sink(log_dir: &Path) -> Option<Arc<dyn GameSink>> {
    match JsonlGameSink::new(log_dir) {
        Ok(sink) => Some(Arc::new(sink)),
        Err(e) => {
            warn!(error = %e, "Could not open log sink, continuing without logging");
            None
        }
    }
}

/// Run the HTTP game server
async fn run_http(host: String, port: u16, log_dir: &Path) -> Result<()> {
    info!("Starting Tictactoe Arena HTTP server");

    let sessions = SessionManager::new(open_sink(log_dir));
    tictactoe_arena::run_server(host, port, sessions).await
}

/// Play games to completion locally and print the outcomes
async fn run_play(games: u32, config: Option<&Path>, log_dir: &Path) -> Result<()> {
    let match_config = match config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };

    let sink = if *match_config.enable_logging() {
        open_sink(log_dir)
    } else {
        None
    };
    let sessions = SessionManager::new(sink);

    let mut x_wins = 0u32;
    let mut o_wins = 0u32;
    let mut draws = 0u32;

    for game in 1..=games {
        let created = sessions.create(
            match_config.player_x().clone(),
            match_config.player_o().clone(),
            *match_config.enable_logging(),
        );
        let outcome = sessions.play_to_completion(&created.game_id).await?;

        match outcome.winner {
            Some(tictactoe_arena::Mark::X) => x_wins += 1,
            Some(tictactoe_arena::Mark::O) => o_wins += 1,
            None => draws += 1,
        }

        let result = match outcome.winner {
            Some(winner) => format!("{} wins", winner),
            None => "draw".to_string(),
        };
        println!(
            "Game {}/{} ({}): {} in {} moves",
            game, games, created.game_id, result, outcome.total_moves
        );

        sessions.delete(&created.game_id)?;
    }

    println!("X wins: {}  O wins: {}  Draws: {}", x_wins, o_wins, draws);
    Ok(())
}
