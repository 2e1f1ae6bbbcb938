//! Prompt construction for LLM-backed players.

use crate::games::tictactoe::{Board, Coord, Mark};

/// System instruction sent with every move request.
pub const SYSTEM_PROMPT: &str = "\
You are an expert tic-tac-toe player. Your goal is to win the game by making strategic moves.

Rules:
- The board is a 3x3 grid with positions (0,0) to (2,2)
- Row 0 is the top row, row 2 is the bottom row
- Column 0 is the left column, column 2 is the right column
- You win by getting three of your symbols in a row (horizontal, vertical, or diagonal)
- Block your opponent from getting three in a row
- Take the center if available
- Take corners when possible

You must respond with ONLY a JSON object in this exact format:
{\"row\": 0, \"col\": 1, \"reasoning\": \"brief explanation\"}

The row and col values must be integers between 0 and 2.
Do not include any other text or explanation outside the JSON object.";

/// Builds the user prompt for one move: rendered board, available moves,
/// and the acting mark.
pub fn move_prompt(board: &Board, mark: Mark, available_moves: &[Coord]) -> String {
    let moves = available_moves
        .iter()
        .map(|(row, col)| format!("({},{})", row, col))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Current Board State:\n{}\n\
         You are playing as: {}\n\
         Available moves (row, col): {}\n\n\
         Analyze the board and choose your best move. Consider:\n\
         1. Can you win on this move?\n\
         2. Must you block opponent from winning?\n\
         3. Strategic positioning (center, corners, sides)\n\n\
         Respond with JSON only: {{\"row\": <int>, \"col\": <int>, \"reasoning\": \"<brief explanation>\"}}",
        board.display(),
        mark,
        moves
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_prompt_names_mark_and_moves() {
        let mut board = Board::new();
        board.apply(0, 0, Mark::X);
        let available = board.available_moves();
        let prompt = move_prompt(&board, Mark::O, &available);

        assert!(prompt.contains("You are playing as: O"));
        assert!(prompt.contains("(0,1)"));
        assert!(!prompt.contains("(0,0),"));
        assert!(prompt.contains("Respond with JSON only"));
    }

    #[test]
    fn test_move_prompt_renders_board() {
        let mut board = Board::new();
        board.apply(1, 1, Mark::X);
        let available = board.available_moves();
        let prompt = move_prompt(&board, Mark::O, &available);
        assert!(prompt.contains("| X |"));
    }
}
