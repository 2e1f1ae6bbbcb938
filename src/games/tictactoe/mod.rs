//! 3x3 tic-tac-toe: board storage and rule evaluation.

mod types;

pub mod rules;

pub use types::{Board, Coord, Evaluation, GameStatus, Mark, MoveRecord, Square};
