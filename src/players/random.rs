//! Uniformly-random move selection.

use super::{DecisionProvider, MoveMetadata, PlayerKind, random_choice};
use crate::games::tictactoe::{Board, Coord, Mark};
use tracing::debug;

/// Player that samples uniformly from the open squares.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlayer;

#[async_trait::async_trait]
impl DecisionProvider for RandomPlayer {
    async fn choose(&self, board: &Board, mark: Mark) -> (Option<Coord>, MoveMetadata) {
        let moves = board.available_moves();
        let choice = random_choice(&moves);
        debug!(?choice, %mark, "Random player chose move");
        (choice, MoveMetadata::for_kind(PlayerKind::Random))
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Random
    }

    fn model_name(&self) -> Option<&str> {
        None
    }
}
