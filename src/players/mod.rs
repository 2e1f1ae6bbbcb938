//! Move-decision policies: random and completion-backed players.

mod llm;
mod random;

pub use llm::LlmPlayer;
pub use random::RandomPlayer;

use crate::config::PlayerConfig;
use crate::games::tictactoe::{Board, Coord, Mark};
use crate::llm_client::LlmClient;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which policy produced a move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKind {
    /// Uniform choice over the open squares.
    Random,
    /// Completion-service-backed choice.
    Llm,
}

/// Diagnostic record of a single move decision.
///
/// Produced fresh per attempt. For a completion-backed player the configured
/// `player_type` is reported even when the decision fell back to random;
/// the fallback is visible only through `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveMetadata {
    /// The configured policy of the deciding player.
    pub player_type: PlayerKind,
    /// Prompt sent to the completion service, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Raw completion-service reply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Reasoning extracted from the reply, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Wall-clock service latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Description of a decision failure that triggered random fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveMetadata {
    /// Empty metadata for the given policy.
    pub fn for_kind(player_type: PlayerKind) -> Self {
        Self {
            player_type,
            prompt: None,
            response: None,
            reasoning: None,
            response_time_ms: None,
            error: None,
        }
    }
}

/// A policy that chooses a move for a given mark.
#[async_trait::async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Chooses a move from the board's open squares.
    ///
    /// Returns `None` only when the board has no open square; with at least
    /// one available move this never fails.
    async fn choose(&self, board: &Board, mark: Mark) -> (Option<Coord>, MoveMetadata);

    /// The policy this provider implements.
    fn kind(&self) -> PlayerKind;

    /// Model name, for completion-backed providers.
    fn model_name(&self) -> Option<&str>;
}

/// Uniform choice over a move list.
pub(crate) fn random_choice(moves: &[Coord]) -> Option<Coord> {
    moves.choose(&mut rand::thread_rng()).copied()
}

/// Builds the provider for a player configuration.
///
/// When `use_llm` is set but the provider's API key is not available, the
/// player degrades to random selection for the whole session and reports
/// type `random` thereafter.
pub fn provider_from_config(config: &PlayerConfig) -> Box<dyn DecisionProvider> {
    if !config.use_llm() {
        return Box::new(RandomPlayer);
    }

    match config.create_llm_config() {
        Ok(llm_config) => Box::new(LlmPlayer::new(
            Box::new(LlmClient::new(llm_config)),
            config.model().clone(),
        )),
        Err(e) => {
            warn!(error = %e, "Could not create LLM client, falling back to random moves");
            Box::new(RandomPlayer)
        }
    }
}
