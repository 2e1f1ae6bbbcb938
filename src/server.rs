//! HTTP boundary over the session registry.
//!
//! Thin routing layer only; all state-machine and failure-handling logic
//! lives in [`crate::session`].

use crate::config::PlayerConfig;
use crate::session::{
    CreatedSession, GameOutcome, MoveOutcome, SessionError, SessionInfo, SessionManager,
    SessionState,
};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    /// The session registry.
    pub sessions: SessionManager,
}

/// Request body for creating a game.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    /// Configuration for player X; defaults to a random player.
    pub player_x: Option<PlayerConfig>,
    /// Configuration for player O; defaults to a random player.
    pub player_o: Option<PlayerConfig>,
    /// Whether moves and outcomes are recorded to the log sink.
    #[serde(default = "default_enable_logging")]
    pub enable_logging: bool,
}

fn default_enable_logging() -> bool {
    true
}

impl Default for CreateGameRequest {
    fn default() -> Self {
        Self {
            player_x: None,
            player_o: None,
            enable_logging: default_enable_logging(),
        }
    }
}

/// Request body for making a move. Without coordinates, the current
/// player's decision policy chooses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveRequest {
    /// Row to play (0-2).
    pub row: Option<usize>,
    /// Column to play (0-2).
    pub col: Option<usize>,
}

/// Response for a game-state query.
#[derive(Debug, Clone, Serialize)]
pub struct GameStateResponse {
    /// Session id.
    pub game_id: String,
    /// Current state.
    pub state: SessionState,
}

/// Response for a move request.
#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    /// Session id.
    pub game_id: String,
    /// The move result.
    #[serde(flatten)]
    pub outcome: MoveOutcome,
}

/// Response for an auto-play request.
#[derive(Debug, Clone, Serialize)]
pub struct AutoPlayResponse {
    /// Session id.
    pub game_id: String,
    /// The aggregate game result.
    #[serde(flatten)]
    pub outcome: GameOutcome,
}

/// Response for a session listing.
#[derive(Debug, Clone, Serialize)]
pub struct GameListResponse {
    /// Number of registered sessions.
    pub total_games: usize,
    /// Per-session summaries.
    pub games: Vec<SessionInfo>,
}

/// Response for a deletion.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Session id.
    pub game_id: String,
    /// Confirmation message.
    pub message: String,
}

/// Error wrapper mapping registry failures to HTTP statuses.
pub struct ApiError(SessionError);

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SessionError::NotFound { .. } => StatusCode::NOT_FOUND,
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{game_id}", get(get_game).delete(delete_game))
        .route("/games/{game_id}/move", post(make_move))
        .route("/games/{game_id}/auto", post(play_auto))
        .route("/games/{game_id}/reset", post(reset_game))
        .with_state(state)
}

/// Binds and serves the HTTP API until the process ends.
pub async fn run(host: String, port: u16, sessions: SessionManager) -> anyhow::Result<()> {
    let app = router(AppState { sessions });
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[instrument(skip(state, request))]
async fn create_game(
    State(state): State<AppState>,
    request: Option<Json<CreateGameRequest>>,
) -> Json<CreatedSession> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let created = state.sessions.create(
        request.player_x.unwrap_or_default(),
        request.player_o.unwrap_or_default(),
        request.enable_logging,
    );
    Json(created)
}

#[instrument(skip(state))]
async fn list_games(State(state): State<AppState>) -> Json<GameListResponse> {
    let games = state.sessions.list().await;
    Json(GameListResponse {
        total_games: games.len(),
        games,
    })
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let session_state = state.sessions.get_state(&game_id).await?;
    Ok(Json(GameStateResponse {
        game_id,
        state: session_state,
    }))
}

#[instrument(skip(state, request))]
async fn make_move(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    request: Option<Json<MoveRequest>>,
) -> Result<Json<MoveResponse>, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let outcome = state
        .sessions
        .make_move(&game_id, request.row, request.col)
        .await?;
    Ok(Json(MoveResponse { game_id, outcome }))
}

#[instrument(skip(state))]
async fn play_auto(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<AutoPlayResponse>, ApiError> {
    let outcome = state.sessions.play_to_completion(&game_id).await?;
    Ok(Json(AutoPlayResponse { game_id, outcome }))
}

#[instrument(skip(state))]
async fn reset_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let session_state = state.sessions.reset(&game_id).await?;
    Ok(Json(GameStateResponse {
        game_id,
        state: session_state,
    }))
}

#[instrument(skip(state))]
async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.sessions.delete(&game_id)?;
    Ok(Json(DeleteResponse {
        game_id,
        message: "Game deleted successfully".to_string(),
    }))
}
