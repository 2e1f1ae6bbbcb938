//! Tictactoe Arena library - LLM-vs-random tic-tac-toe sessions
//!
//! Runs turn-based tic-tac-toe sessions in which each side is either a
//! uniformly-random move chooser or a move chooser driven by a
//! text-completion service, and records every decision for later
//! inspection.
//!
//! # Architecture
//!
//! - **Board**: 3x3 grid with write-once cells and pure rule evaluation
//! - **Players**: decision policies (random, completion-backed with
//!   random fallback)
//! - **Session**: per-game state machine plus the in-memory registry
//! - **Logger**: append-only JSONL records of move attempts and outcomes
//! - **Server**: thin HTTP routing over the registry
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_arena::{PlayerConfig, SessionManager};
//!
//! # async fn example() {
//! let sessions = SessionManager::new(None);
//! let created = sessions.create(
//!     PlayerConfig::default(),
//!     PlayerConfig::default(),
//!     false,
//! );
//! let outcome = sessions.play_to_completion(&created.game_id).await.unwrap();
//! assert!(outcome.is_draw || outcome.winner.is_some());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod config;
mod games;
mod llm_client;
mod logger;
mod players;
mod prompts;
mod server;
mod session;

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{ConfigError, MatchConfig, PlayerConfig};

// Crate-level exports - LLM client
pub use llm_client::{CompletionClient, LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Log sink
pub use logger::{GameRow, GameSink, JsonlGameSink, MoveRow, SinkError};

// Crate-level exports - Decision providers
pub use players::{DecisionProvider, LlmPlayer, MoveMetadata, PlayerKind, RandomPlayer};

// Crate-level exports - Prompt construction
pub use prompts::{SYSTEM_PROMPT, move_prompt};

// Crate-level exports - HTTP boundary
pub use server::{AppState, CreateGameRequest, MoveRequest, router, run as run_server};

// Crate-level exports - Session management
pub use session::{
    CreatedSession, GameOutcome, GameSession, MoveOutcome, PlayerDescriptor, SessionError,
    SessionId, SessionInfo, SessionManager, SessionPlayer, SessionState,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Coord, Evaluation, GameStatus, Mark, MoveRecord, Square, rules,
};
