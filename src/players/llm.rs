//! Completion-service-backed move selection with random fallback.

use super::{DecisionProvider, MoveMetadata, PlayerKind, random_choice};
use crate::games::tictactoe::{Board, Coord, Mark};
use crate::llm_client::CompletionClient;
use crate::prompts;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Expected reply shape: a strict JSON object with integer coordinates.
#[derive(Debug, Deserialize)]
struct MoveReply {
    row: i64,
    col: i64,
    reasoning: Option<String>,
}

/// Player that asks a completion service for each move.
///
/// Any failure - service error, unparsable reply, missing or non-integer
/// fields, or a move that is not currently available - resolves to a random
/// legal move for that single decision, with the failure recorded in
/// `MoveMetadata.error`. The provider never raises and never retries.
pub struct LlmPlayer {
    client: Box<dyn CompletionClient>,
    model: String,
}

impl LlmPlayer {
    /// Creates a completion-backed player over an injected client.
    pub fn new(client: Box<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl DecisionProvider for LlmPlayer {
    async fn choose(&self, board: &Board, mark: Mark) -> (Option<Coord>, MoveMetadata) {
        let available = board.available_moves();
        if available.is_empty() {
            return (None, MoveMetadata::for_kind(PlayerKind::Llm));
        }

        let mut metadata = MoveMetadata::for_kind(PlayerKind::Llm);
        let user_prompt = prompts::move_prompt(board, mark, &available);
        metadata.prompt = Some(user_prompt.clone());

        let start = Instant::now();
        match self.client.invoke(prompts::SYSTEM_PROMPT, &user_prompt).await {
            Ok(response) => {
                metadata.response_time_ms = Some(start.elapsed().as_millis() as u64);
                metadata.response = Some(response.clone());

                match parse_move_reply(&response) {
                    Ok((coord, reasoning)) => {
                        metadata.reasoning = reasoning;
                        if available.contains(&coord) {
                            debug!(?coord, %mark, "LLM chose move");
                            return (Some(coord), metadata);
                        }
                        metadata.error = Some(format!(
                            "Invalid move {:?} not in available moves",
                            coord
                        ));
                    }
                    Err(reason) => {
                        metadata.error = Some(reason);
                    }
                }
            }
            Err(e) => {
                metadata.response_time_ms = Some(start.elapsed().as_millis() as u64);
                metadata.error = Some(e.to_string());
            }
        }

        // Single-decision fallback: the configured player_type stays llm,
        // the failure is visible only through metadata.error.
        warn!(%mark, error = ?metadata.error, "LLM move failed, using random fallback");
        (random_choice(&available), metadata)
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Llm
    }

    fn model_name(&self) -> Option<&str> {
        Some(&self.model)
    }
}

/// Extracts the JSON payload from a reply, tolerating a Markdown code fence
/// around the object.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some(rest) = trimmed.split("```json").nth(1) {
        rest.split("```").next().unwrap_or(rest).trim()
    } else if let Some(rest) = trimmed.split("```").nth(1) {
        rest.trim()
    } else {
        trimmed
    }
}

/// Parses a reply into a board coordinate and optional reasoning.
///
/// Coordinates must be integers in [0, 2]; anything else is an error
/// described well enough to land in `MoveMetadata.error`.
fn parse_move_reply(response: &str) -> Result<(Coord, Option<String>), String> {
    let payload = extract_json(response);

    let reply: MoveReply = serde_json::from_str(payload)
        .map_err(|e| format!("Failed to parse LLM response as JSON: {}", e))?;

    if !(0..=2).contains(&reply.row) || !(0..=2).contains(&reply.col) {
        return Err(format!(
            "Coordinates ({}, {}) out of range",
            reply.row, reply.col
        ));
    }

    Ok(((reply.row as usize, reply.col as usize), reply.reasoning))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let (coord, reasoning) =
            parse_move_reply(r#"{"row": 1, "col": 2, "reasoning": "block"}"#).unwrap();
        assert_eq!(coord, (1, 2));
        assert_eq!(reasoning.as_deref(), Some("block"));
    }

    #[test]
    fn test_parse_reasoning_optional() {
        let (coord, reasoning) = parse_move_reply(r#"{"row": 0, "col": 0}"#).unwrap();
        assert_eq!(coord, (0, 0));
        assert_eq!(reasoning, None);
    }

    #[test]
    fn test_parse_json_code_fence() {
        let response = "```json\n{\"row\": 2, \"col\": 0, \"reasoning\": \"corner\"}\n```";
        let (coord, _) = parse_move_reply(response).unwrap();
        assert_eq!(coord, (2, 0));
    }

    #[test]
    fn test_parse_plain_code_fence() {
        let response = "```\n{\"row\": 1, \"col\": 1}\n```";
        let (coord, _) = parse_move_reply(response).unwrap();
        assert_eq!(coord, (1, 1));
    }

    #[test]
    fn test_parse_rejects_junk() {
        assert!(parse_move_reply("I'll take the center!").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        assert!(parse_move_reply(r#"{"row": 1}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        assert!(parse_move_reply(r#"{"row": 1.5, "col": 0}"#).is_err());
        assert!(parse_move_reply(r#"{"row": "1", "col": 0}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(parse_move_reply(r#"{"row": 3, "col": 0}"#).is_err());
        assert!(parse_move_reply(r#"{"row": -1, "col": 0}"#).is_err());
    }
}
