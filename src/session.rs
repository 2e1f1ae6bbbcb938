//! Game session state machine and in-memory session registry.

use crate::config::PlayerConfig;
use crate::games::tictactoe::{Board, Coord, GameStatus, Mark, MoveRecord};
use crate::logger::{GameRow, GameSink, MoveRow};
use crate::players::{DecisionProvider, MoveMetadata, PlayerKind, provider_from_config};
use derive_more::{Display, Error};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Unique identifier for a game session.
pub type SessionId = String;

/// One side of a session: the immutable configuration plus the policy
/// built from it.
pub struct SessionPlayer {
    config: PlayerConfig,
    provider: Box<dyn DecisionProvider>,
}

impl SessionPlayer {
    /// Builds the player and its decision policy from a configuration.
    pub fn from_config(config: PlayerConfig) -> Self {
        let provider = provider_from_config(&config);
        Self { config, provider }
    }

    /// Builds a player over an explicit policy (used by tests to inject
    /// fake completion clients).
    pub fn new(config: PlayerConfig, provider: Box<dyn DecisionProvider>) -> Self {
        Self { config, provider }
    }

    /// The player's configuration.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The effective policy (reports random when an LLM player degraded at
    /// construction time).
    pub fn kind(&self) -> PlayerKind {
        self.provider.kind()
    }

    /// Model name, for completion-backed players.
    pub fn model_name(&self) -> Option<String> {
        self.provider.model_name().map(str::to_string)
    }

    /// Describes the player for API responses and game summaries.
    pub fn descriptor(&self) -> PlayerDescriptor {
        PlayerDescriptor {
            kind: self.kind(),
            model: self.model_name(),
        }
    }
}

/// Player policy and model, as reported outward.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerDescriptor {
    /// Effective policy.
    #[serde(rename = "type")]
    pub kind: PlayerKind,
    /// Model name, if completion-backed.
    pub model: Option<String>,
}

/// Result of one `make_move` call.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    /// Whether a move was applied.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// Board snapshot after the call.
    pub board: [[Option<Mark>; 3]; 3],
    /// Whether the session is in a terminal state.
    pub game_over: bool,
    /// Winning mark, when the game is won.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Mark to move next, while the game is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<Mark>,
    /// The materialized move, on success.
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub mv: Option<MoveRecord>,
    /// Decision diagnostics for this attempt.
    pub metadata: MoveMetadata,
}

/// Aggregate result of playing a session to completion.
#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    /// Winning mark, if any.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Final board snapshot.
    pub board: [[Option<Mark>; 3]; 3],
    /// Per-move results in play order.
    pub moves: Vec<MoveOutcome>,
    /// Number of materialized moves.
    pub total_moves: usize,
}

/// Serializable view of a session's current state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Board snapshot.
    pub board: [[Option<Mark>; 3]; 3],
    /// Mark to move, while the game is active.
    pub current_player: Option<Mark>,
    /// Winning mark, if any.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Whether the session is in a terminal state.
    pub game_over: bool,
    /// Materialized moves in play order.
    pub move_history: Vec<MoveRecord>,
    /// Open squares, empty once the game is over.
    pub available_moves: Vec<Coord>,
}

/// Summary of a session for listings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    /// Session id.
    pub game_id: SessionId,
    /// Effective policy of player X.
    pub player_x_type: PlayerKind,
    /// Effective policy of player O.
    pub player_o_type: PlayerKind,
    /// Whether the session is in a terminal state.
    pub game_over: bool,
    /// Winning mark, if any.
    pub winner: Option<Mark>,
}

/// Newly created session, as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedSession {
    /// Session id.
    pub game_id: SessionId,
    /// Initial state.
    pub state: SessionState,
    /// Player X policy and model.
    pub player_x: PlayerDescriptor,
    /// Player O policy and model.
    pub player_o: PlayerDescriptor,
}

/// One game's full mutable state plus its two player configurations.
///
/// The turn mark strictly alternates X, O, X, O while the game is active;
/// once the status leaves `InProgress`, no further moves are accepted until
/// `reset`.
pub struct GameSession {
    id: SessionId,
    board: Board,
    player_x: SessionPlayer,
    player_o: SessionPlayer,
    current: Mark,
    status: GameStatus,
    history: Vec<MoveRecord>,
    started_at: Instant,
    sink: Option<Arc<dyn GameSink>>,
}

impl GameSession {
    /// Creates a new active session with an empty board and X to move.
    #[instrument(skip(player_x, player_o, sink), fields(session_id = %id))]
    pub fn new(
        id: SessionId,
        player_x: PlayerConfig,
        player_o: PlayerConfig,
        sink: Option<Arc<dyn GameSink>>,
    ) -> Self {
        info!("Creating new game session");
        Self::with_players(
            id,
            SessionPlayer::from_config(player_x),
            SessionPlayer::from_config(player_o),
            sink,
        )
    }

    /// Creates a session over pre-built players.
    pub fn with_players(
        id: SessionId,
        player_x: SessionPlayer,
        player_o: SessionPlayer,
        sink: Option<Arc<dyn GameSink>>,
    ) -> Self {
        Self {
            id,
            board: Board::new(),
            player_x,
            player_o,
            current: Mark::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
            started_at: Instant::now(),
            sink,
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Materialized moves in play order.
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Winning mark, if the game is won.
    pub fn winner(&self) -> Option<Mark> {
        match self.status {
            GameStatus::Won(mark) => Some(mark),
            _ => None,
        }
    }

    /// Mark to move, while the game is active.
    pub fn current_player(&self) -> Option<Mark> {
        match self.status {
            GameStatus::InProgress => Some(self.current),
            _ => None,
        }
    }

    /// The player owning the given mark.
    pub fn player(&self, mark: Mark) -> &SessionPlayer {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// Serializable view of the current state.
    pub fn state(&self) -> SessionState {
        let game_over = self.status != GameStatus::InProgress;
        SessionState {
            board: self.board.snapshot(),
            current_player: self.current_player(),
            winner: self.winner(),
            is_draw: self.status == GameStatus::Draw,
            game_over,
            move_history: self.history.clone(),
            available_moves: if game_over {
                Vec::new()
            } else {
                self.board.available_moves()
            },
        }
    }

    /// Makes a move. When `row` or `col` is absent, the current player's
    /// decision policy chooses the cell.
    ///
    /// Coordinate and terminal-state failures are reported through
    /// `success = false` and never mutate the session.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn make_move(&mut self, row: Option<usize>, col: Option<usize>) -> MoveOutcome {
        if self.status != GameStatus::InProgress {
            debug!("Rejecting move on finished game");
            return MoveOutcome {
                success: false,
                message: "Game is already over".to_string(),
                board: self.board.snapshot(),
                game_over: true,
                winner: self.winner(),
                is_draw: self.status == GameStatus::Draw,
                current_player: None,
                mv: None,
                metadata: MoveMetadata::for_kind(PlayerKind::Random),
            };
        }

        let available = self.board.available_moves();
        if available.is_empty() {
            // A full board is terminal even if no evaluation ran
            self.status = GameStatus::Draw;
            self.log_game_summary();
            return MoveOutcome {
                success: false,
                message: "No available moves".to_string(),
                board: self.board.snapshot(),
                game_over: true,
                winner: None,
                is_draw: true,
                current_player: None,
                mv: None,
                metadata: MoveMetadata::for_kind(PlayerKind::Random),
            };
        }

        let mark = self.current;
        let (row, col, metadata) = match (row, col) {
            (Some(row), Some(col)) => {
                // Caller-supplied coordinates bypass the decision policy.
                (row, col, MoveMetadata::for_kind(PlayerKind::Random))
            }
            _ => {
                let (choice, metadata) =
                    self.player(mark).provider.choose(&self.board, mark).await;
                match choice {
                    Some((row, col)) => (row, col, metadata),
                    None => {
                        warn!("Decision provider produced no move");
                        return MoveOutcome {
                            success: false,
                            message: "No available moves".to_string(),
                            board: self.board.snapshot(),
                            game_over: false,
                            winner: None,
                            is_draw: false,
                            current_player: Some(mark),
                            mv: None,
                            metadata,
                        };
                    }
                }
            }
        };

        let valid = self.board.apply(row, col, mark);

        // Every attempt is offered to the sink, rejected ones included.
        self.log_move(&available, row, col, valid, &metadata);

        if !valid {
            debug!(row, col, "Invalid move attempt");
            return MoveOutcome {
                success: false,
                message: format!("Invalid move at ({}, {})", row, col),
                board: self.board.snapshot(),
                game_over: false,
                winner: None,
                is_draw: false,
                current_player: Some(mark),
                mv: None,
                metadata,
            };
        }

        let record = MoveRecord {
            player: mark,
            row,
            col,
            reasoning: metadata.reasoning.clone(),
        };
        self.history.push(record.clone());

        let evaluation = self.board.evaluate();

        if let Some(winner) = evaluation.winner {
            self.status = GameStatus::Won(winner);
            info!(%winner, moves = self.history.len(), "Game won");
            self.log_game_summary();
            return MoveOutcome {
                success: true,
                message: format!("{} wins!", winner),
                board: self.board.snapshot(),
                game_over: true,
                winner: Some(winner),
                is_draw: false,
                current_player: None,
                mv: Some(record),
                metadata,
            };
        }

        if evaluation.is_draw {
            self.status = GameStatus::Draw;
            info!(moves = self.history.len(), "Game drawn");
            self.log_game_summary();
            return MoveOutcome {
                success: true,
                message: "It's a draw!".to_string(),
                board: self.board.snapshot(),
                game_over: true,
                winner: None,
                is_draw: true,
                current_player: None,
                mv: Some(record),
                metadata,
            };
        }

        self.current = mark.opponent();
        MoveOutcome {
            success: true,
            message: "Move successful".to_string(),
            board: self.board.snapshot(),
            game_over: false,
            winner: None,
            is_draw: false,
            current_player: Some(self.current),
            mv: Some(record),
            metadata,
        }
    }

    /// Repeatedly makes policy-chosen moves until the session is terminal.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn play_to_completion(&mut self) -> GameOutcome {
        let mut moves = Vec::new();
        while self.status == GameStatus::InProgress {
            let result = self.make_move(None, None).await;
            let progressed = result.success;
            moves.push(result);
            if !progressed && self.status == GameStatus::InProgress {
                // A failed policy move cannot advance the game; bail
                // rather than spin.
                warn!("Aborting auto-play after a non-advancing move");
                break;
            }
        }
        GameOutcome {
            winner: self.winner(),
            is_draw: self.status == GameStatus::Draw,
            board: self.board.snapshot(),
            total_moves: self.history.len(),
            moves,
        }
    }

    /// Returns to the initial state: empty board, X to move, history
    /// cleared. Player configurations are unchanged.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&mut self) {
        info!("Resetting session");
        self.board.reset();
        self.current = Mark::X;
        self.status = GameStatus::InProgress;
        self.history.clear();
        self.started_at = Instant::now();
    }

    fn log_move(
        &self,
        available: &[Coord],
        row: usize,
        col: usize,
        valid: bool,
        metadata: &MoveMetadata,
    ) {
        let Some(sink) = &self.sink else {
            return;
        };
        let record = MoveRow {
            game_id: self.id.clone(),
            move_number: self.history.len() + 1,
            player: self.current,
            player_type: metadata.player_type,
            board_state: self.board.snapshot(),
            available_moves: available.to_vec(),
            prompt_sent: metadata.prompt.clone(),
            llm_response: metadata.response.clone(),
            llm_reasoning: metadata.reasoning.clone(),
            chosen_move: Some((row, col)),
            move_valid: valid,
            error_message: metadata.error.clone(),
            response_time_ms: metadata.response_time_ms,
        };
        if let Err(e) = sink.record_move(&record) {
            warn!(error = %e, "Failed to record move, gameplay continues");
        }
    }

    fn log_game_summary(&self) {
        let Some(sink) = &self.sink else {
            return;
        };
        let record = GameRow {
            game_id: self.id.clone(),
            player_x_type: self.player_x.kind(),
            player_x_model: self.player_x.model_name(),
            player_o_type: self.player_o.kind(),
            player_o_model: self.player_o.model_name(),
            total_moves: self.history.len(),
            winner: self.winner(),
            is_draw: self.status == GameStatus::Draw,
            duration_seconds: self.started_at.elapsed().as_secs_f64(),
            final_board_state: self.board.snapshot(),
        };
        if let Err(e) = sink.record_game(&record) {
            warn!(error = %e, "Failed to record game summary, gameplay continues");
        }
    }
}

/// In-memory registry of sessions keyed by opaque id.
///
/// Each session sits behind its own async lock: requests addressed at the
/// same id serialize (the lock is held across the completion-service call),
/// while distinct ids proceed concurrently.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<GameSession>>>>>,
    sink: Option<Arc<dyn GameSink>>,
}

impl SessionManager {
    /// Creates a session manager writing to the given sink (if any).
    #[instrument(skip(sink))]
    pub fn new(sink: Option<Arc<dyn GameSink>>) -> Self {
        info!(logging = sink.is_some(), "Creating session manager");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            sink,
        }
    }

    /// Creates a new session and returns its id, initial state, and player
    /// descriptors.
    #[instrument(skip(self, player_x, player_o))]
    pub fn create(
        &self,
        player_x: PlayerConfig,
        player_o: PlayerConfig,
        enable_logging: bool,
    ) -> CreatedSession {
        let id = Uuid::new_v4().to_string();
        let sink = if enable_logging {
            self.sink.clone()
        } else {
            None
        };
        let session = GameSession::new(id.clone(), player_x, player_o, sink);
        let created = CreatedSession {
            game_id: id.clone(),
            state: session.state(),
            player_x: session.player(Mark::X).descriptor(),
            player_o: session.player(Mark::O).descriptor(),
        };
        self.sessions
            .lock()
            .unwrap()
            .insert(id.clone(), Arc::new(tokio::sync::Mutex::new(session)));
        info!(session_id = %id, "Created new session");
        created
    }

    fn get(&self, id: &str) -> Result<Arc<tokio::sync::Mutex<GameSession>>, SessionError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound { id: id.to_string() })
    }

    /// Current state of a session.
    pub async fn get_state(&self, id: &str) -> Result<SessionState, SessionError> {
        let session = self.get(id)?;
        let session = session.lock().await;
        Ok(session.state())
    }

    /// Makes a move in a session; same-id calls serialize on the session
    /// lock.
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        id: &str,
        row: Option<usize>,
        col: Option<usize>,
    ) -> Result<MoveOutcome, SessionError> {
        let session = self.get(id)?;
        let mut session = session.lock().await;
        Ok(session.make_move(row, col).await)
    }

    /// Plays a session to completion.
    #[instrument(skip(self))]
    pub async fn play_to_completion(&self, id: &str) -> Result<GameOutcome, SessionError> {
        let session = self.get(id)?;
        let mut session = session.lock().await;
        Ok(session.play_to_completion().await)
    }

    /// Resets a session and returns its fresh state.
    #[instrument(skip(self))]
    pub async fn reset(&self, id: &str) -> Result<SessionState, SessionError> {
        let session = self.get(id)?;
        let mut session = session.lock().await;
        session.reset();
        Ok(session.state())
    }

    /// Removes a session from the registry.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound { id: id.to_string() })
    }

    /// Summaries of all registered sessions.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let handles: Vec<_> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .map(|(id, session)| (id.clone(), Arc::clone(session)))
            .collect();

        let mut infos = Vec::with_capacity(handles.len());
        for (game_id, handle) in handles {
            let session = handle.lock().await;
            infos.push(SessionInfo {
                game_id,
                player_x_type: session.player(Mark::X).kind(),
                player_o_type: session.player(Mark::O).kind(),
                game_over: session.status() != GameStatus::InProgress,
                winner: session.winner(),
            });
        }
        infos
    }
}

/// Session registry error.
#[derive(Debug, Clone, Display, Error)]
pub enum SessionError {
    /// No session registered under the given id.
    #[display("Session not found: {id}")]
    NotFound {
        /// The unknown session id.
        id: String,
    },
}
