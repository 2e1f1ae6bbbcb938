//! Win detection logic for tic-tac-toe.

use super::super::types::{Board, Coord, Mark, Square};
use tracing::instrument;

/// Checks if there is a winner on the board.
///
/// The eight lines are checked in a fixed order (three rows, three columns,
/// two diagonals) and the first complete line wins, keeping evaluation
/// deterministic.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Mark> {
    const LINES: [[Coord; 3]; 8] = [
        // Rows
        [(0, 0), (0, 1), (0, 2)],
        [(1, 0), (1, 1), (1, 2)],
        [(2, 0), (2, 1), (2, 2)],
        // Columns
        [(0, 0), (1, 0), (2, 0)],
        [(0, 1), (1, 1), (2, 1)],
        [(0, 2), (1, 2), (2, 2)],
        // Diagonals
        [(0, 0), (1, 1), (2, 2)],
        [(0, 2), (1, 1), (2, 0)],
    ];

    for [a, b, c] in LINES {
        let sq = board.get(a.0, a.1);
        if let Some(Square::Occupied(mark)) = sq {
            if sq == board.get(b.0, b.1) && sq == board.get(c.0, c.1) {
                return Some(mark);
            }
        }
    }

    None
}
