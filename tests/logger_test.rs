//! Integration tests for the JSONL game sink.

use std::sync::Arc;
use tictactoe_arena::{
    GameRow, GameSession, GameSink, JsonlGameSink, Mark, MoveRow, PlayerConfig, PlayerKind,
};

fn sample_move_row() -> MoveRow {
    MoveRow {
        game_id: "game-1".to_string(),
        move_number: 1,
        player: Mark::X,
        player_type: PlayerKind::Llm,
        board_state: [[Some(Mark::X), None, None], [None; 3], [None; 3]],
        available_moves: vec![(0, 1), (0, 2)],
        prompt_sent: Some("prompt".to_string()),
        llm_response: Some(r#"{"row": 0, "col": 0}"#.to_string()),
        llm_reasoning: Some("opening corner".to_string()),
        chosen_move: Some((0, 0)),
        move_valid: true,
        error_message: None,
        response_time_ms: Some(120),
    }
}

#[test]
fn test_sink_writes_one_json_object_per_record() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlGameSink::new(dir.path()).unwrap();

    sink.record_move(&sample_move_row()).unwrap();
    sink.record_move(&MoveRow {
        move_number: 2,
        player: Mark::O,
        player_type: PlayerKind::Random,
        move_valid: false,
        error_message: Some("cell occupied".to_string()),
        ..sample_move_row()
    })
    .unwrap();

    let content = std::fs::read_to_string(sink.moves_path()).unwrap();
    let lines: Vec<&str> = content.trim().lines().collect();
    assert_eq!(lines.len(), 2);

    for line in &lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("timestamp").is_some());
        assert!(value.get("game_id").is_some());
    }

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["player"], "X");
    assert_eq!(first["player_type"], "llm");
    assert_eq!(first["move_valid"], true);
    assert_eq!(first["chosen_move"][0], 0);

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["player_type"], "random");
    assert_eq!(second["move_valid"], false);
    assert_eq!(second["error_message"], "cell occupied");
}

#[test]
fn test_sink_truncates_long_texts() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlGameSink::new(dir.path()).unwrap();

    let mut row = sample_move_row();
    row.prompt_sent = Some("p".repeat(2000));
    row.llm_response = Some("r".repeat(2000));
    sink.record_move(&row).unwrap();

    let content = std::fs::read_to_string(sink.moves_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    let prompt = value["prompt_sent"].as_str().unwrap();
    assert!(prompt.len() < 600);
    assert!(prompt.ends_with("..."));
}

#[test]
fn test_sink_records_game_summary() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonlGameSink::new(dir.path()).unwrap();

    sink.record_game(&GameRow {
        game_id: "game-1".to_string(),
        player_x_type: PlayerKind::Random,
        player_x_model: None,
        player_o_type: PlayerKind::Llm,
        player_o_model: Some("gpt-4o-mini".to_string()),
        total_moves: 7,
        winner: Some(Mark::O),
        is_draw: false,
        duration_seconds: 1.5,
        final_board_state: [[None; 3]; 3],
    })
    .unwrap();

    let content = std::fs::read_to_string(sink.games_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
    assert_eq!(value["winner"], "O");
    assert_eq!(value["player_o_model"], "gpt-4o-mini");
    assert_eq!(value["total_moves"], 7);
    assert!(value.get("timestamp").is_some());
}

#[tokio::test]
async fn test_session_records_moves_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(JsonlGameSink::new(dir.path()).unwrap());

    let mut session = GameSession::new(
        "logged".to_string(),
        PlayerConfig::default(),
        PlayerConfig::default(),
        Some(sink.clone() as Arc<dyn GameSink>),
    );

    // A rejected attempt is offered to the sink too
    session.make_move(Some(0), Some(0)).await;
    session.make_move(Some(0), Some(0)).await;
    let outcome = session.play_to_completion().await;

    let moves_content = std::fs::read_to_string(sink.moves_path()).unwrap();
    let move_lines: Vec<&str> = moves_content.trim().lines().collect();
    // 1 valid explicit move + 1 rejected attempt + the auto-played remainder
    assert_eq!(move_lines.len(), 2 + outcome.moves.len());

    let rejected: serde_json::Value = serde_json::from_str(move_lines[1]).unwrap();
    assert_eq!(rejected["move_valid"], false);

    let games_content = std::fs::read_to_string(sink.games_path()).unwrap();
    let game_lines: Vec<&str> = games_content.trim().lines().collect();
    assert_eq!(game_lines.len(), 1);

    let summary: serde_json::Value = serde_json::from_str(game_lines[0]).unwrap();
    assert_eq!(summary["game_id"], "logged");
    assert_eq!(summary["player_x_type"], "random");
    assert_eq!(
        summary["total_moves"].as_u64().unwrap() as usize,
        session.history().len()
    );
}
