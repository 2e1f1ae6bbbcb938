//! Append-only JSONL records of move attempts and finished games.
//!
//! Two files per run, one row per move attempt and one per finished game.
//! Each row is a single JSON object with a `timestamp` field. Writes are
//! best-effort: the session downgrades sink failures to warnings and play
//! continues.

use crate::games::tictactoe::{Coord, Mark};
use crate::players::PlayerKind;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, instrument};

/// Longest prompt/response text stored per row; the rest is elided.
const TEXT_LIMIT: usize = 500;

/// One recorded move attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRow {
    /// Session the attempt belongs to.
    pub game_id: String,
    /// 1-based attempt sequence number within the session.
    pub move_number: usize,
    /// The mark that attempted the move.
    pub player: Mark,
    /// Policy of the attempting player.
    pub player_type: PlayerKind,
    /// Board snapshot after the attempt.
    pub board_state: [[Option<Mark>; 3]; 3],
    /// Open squares before the attempt.
    pub available_moves: Vec<Coord>,
    /// Prompt sent to the completion service, if any.
    pub prompt_sent: Option<String>,
    /// Raw completion-service reply, if any.
    pub llm_response: Option<String>,
    /// Reasoning extracted from the reply, if any.
    pub llm_reasoning: Option<String>,
    /// The attempted (row, col).
    pub chosen_move: Option<Coord>,
    /// Whether the attempt was applied to the board.
    pub move_valid: bool,
    /// Decision failure description, if any.
    pub error_message: Option<String>,
    /// Completion-service latency in milliseconds.
    pub response_time_ms: Option<u64>,
}

/// One recorded finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRow {
    /// Session id.
    pub game_id: String,
    /// Policy of player X.
    pub player_x_type: PlayerKind,
    /// Model used by player X, if completion-backed.
    pub player_x_model: Option<String>,
    /// Policy of player O.
    pub player_o_type: PlayerKind,
    /// Model used by player O, if completion-backed.
    pub player_o_model: Option<String>,
    /// Number of materialized moves.
    pub total_moves: usize,
    /// Winning mark, if any.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Wall-clock game duration in seconds.
    pub duration_seconds: f64,
    /// Final board snapshot.
    pub final_board_state: [[Option<Mark>; 3]; 3],
}

/// Durable structured record of moves and game outcomes.
///
/// Implementations must be safe for concurrent appends; records are never
/// rewritten or deleted.
pub trait GameSink: Send + Sync {
    /// Appends one move-attempt record.
    fn record_move(&self, row: &MoveRow) -> Result<(), SinkError>;

    /// Appends one finished-game record.
    fn record_game(&self, row: &GameRow) -> Result<(), SinkError>;
}

/// JSONL sink writing one JSON object per line to two append-only files.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes per write and on drop.
pub struct JsonlGameSink {
    moves: Mutex<BufWriter<File>>,
    games: Mutex<BufWriter<File>>,
    moves_path: PathBuf,
    games_path: PathBuf,
}

impl JsonlGameSink {
    /// Creates a sink writing timestamped `moves_*.jsonl` and
    /// `games_*.jsonl` files under `log_dir` (created if absent).
    #[instrument(skip(log_dir), fields(log_dir = %log_dir.as_ref().display()))]
    pub fn new(log_dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)
            .map_err(|e| SinkError::new(format!("Failed to create log directory: {}", e)))?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let moves_path = log_dir.join(format!("moves_{}.jsonl", stamp));
        let games_path = log_dir.join(format!("games_{}.jsonl", stamp));

        let moves = File::create(&moves_path)
            .map_err(|e| SinkError::new(format!("Failed to create moves log: {}", e)))?;
        let games = File::create(&games_path)
            .map_err(|e| SinkError::new(format!("Failed to create games log: {}", e)))?;

        info!(moves = %moves_path.display(), games = %games_path.display(), "Opened game logs");
        Ok(Self {
            moves: Mutex::new(BufWriter::new(moves)),
            games: Mutex::new(BufWriter::new(games)),
            moves_path,
            games_path,
        })
    }

    /// Path of the per-move log file.
    pub fn moves_path(&self) -> &Path {
        &self.moves_path
    }

    /// Path of the per-game log file.
    pub fn games_path(&self) -> &Path {
        &self.games_path
    }

    fn append(
        writer: &Mutex<BufWriter<File>>,
        record: &serde_json::Value,
    ) -> Result<(), SinkError> {
        let line = serde_json::to_string(record)
            .map_err(|e| SinkError::new(format!("Failed to serialize record: {}", e)))?;

        let mut writer = writer
            .lock()
            .map_err(|_| SinkError::new("Log writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)
            .map_err(|e| SinkError::new(format!("Failed to append record: {}", e)))?;
        // Flush per record - rows must survive an abrupt process end
        writer
            .flush()
            .map_err(|e| SinkError::new(format!("Failed to flush log: {}", e)))
    }

    fn stamped(value: serde_json::Value) -> serde_json::Value {
        let timestamp =
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match value {
            serde_json::Value::Object(mut map) => {
                map.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp),
                );
                serde_json::Value::Object(map)
            }
            other => serde_json::json!({ "timestamp": timestamp, "data": other }),
        }
    }
}

fn truncate(text: String) -> String {
    if text.len() > TEXT_LIMIT {
        let mut end = TEXT_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text
    }
}

impl GameSink for JsonlGameSink {
    fn record_move(&self, row: &MoveRow) -> Result<(), SinkError> {
        let mut row = row.clone();
        row.prompt_sent = row.prompt_sent.map(truncate);
        row.llm_response = row.llm_response.map(truncate);

        let value = serde_json::to_value(&row)
            .map_err(|e| SinkError::new(format!("Failed to serialize move row: {}", e)))?;
        Self::append(&self.moves, &Self::stamped(value))
    }

    fn record_game(&self, row: &GameRow) -> Result<(), SinkError> {
        let value = serde_json::to_value(row)
            .map_err(|e| SinkError::new(format!("Failed to serialize game row: {}", e)))?;
        Self::append(&self.games, &Self::stamped(value))
    }
}

impl Drop for JsonlGameSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.moves.lock() {
            let _ = writer.flush();
        }
        if let Ok(mut writer) = self.games.lock() {
            let _ = writer.flush();
        }
    }
}

/// Log sink error.
#[derive(Debug, Clone, Display, Error)]
#[display("Sink error: {} at {}:{}", message, file, line)]
pub struct SinkError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SinkError {
    /// Creates a new sink error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_limits_long_text() {
        let long = "x".repeat(600);
        let out = truncate(long);
        assert_eq!(out.len(), TEXT_LIMIT + 3);
        assert!(out.ends_with("..."));

        let short = "short".to_string();
        assert_eq!(truncate(short), "short");
    }
}
