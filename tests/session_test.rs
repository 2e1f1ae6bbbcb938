//! Integration tests for the game session state machine and registry.

use tictactoe_arena::{
    GameSession, GameStatus, Mark, PlayerConfig, SessionError, SessionManager,
};

fn random_session(id: &str) -> GameSession {
    GameSession::new(
        id.to_string(),
        PlayerConfig::default(),
        PlayerConfig::default(),
        None,
    )
}

#[tokio::test]
async fn test_x_wins_top_row() {
    // X plays (0,0),(0,1),(0,2); O plays (1,0),(1,1) interleaved
    let mut session = random_session("scenario-a");

    let moves = [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)];
    let mut last = None;
    for (row, col) in moves {
        let outcome = session.make_move(Some(row), Some(col)).await;
        assert!(outcome.success, "move ({}, {}) rejected", row, col);
        last = Some(outcome);
    }

    let last = last.unwrap();
    assert!(last.game_over);
    assert_eq!(last.winner, Some(Mark::X));
    assert!(!last.is_draw);
    assert_eq!(session.status(), GameStatus::Won(Mark::X));
}

#[tokio::test]
async fn test_full_board_without_line_is_draw() {
    // Alternating fill ending in O X O / O X X / X O X: no line of three
    // equal marks at any point.
    let mut session = random_session("scenario-b");

    let moves = [
        (1, 1), // X
        (0, 0), // O
        (2, 2), // X
        (0, 2), // O
        (0, 1), // X
        (2, 1), // O
        (2, 0), // X
        (1, 0), // O
        (1, 2), // X
    ];
    let mut last = None;
    for (i, (row, col)) in moves.into_iter().enumerate() {
        let outcome = session.make_move(Some(row), Some(col)).await;
        assert!(outcome.success, "move {} at ({}, {}) rejected", i, row, col);
        last = Some(outcome);
    }

    let last = last.unwrap();
    assert!(last.game_over);
    assert!(last.is_draw);
    assert_eq!(last.winner, None);
    assert_eq!(session.status(), GameStatus::Draw);
}

#[tokio::test]
async fn test_occupied_cell_is_rejected_without_mutation() {
    let mut session = random_session("scenario-c");

    let first = session.make_move(Some(0), Some(0)).await;
    assert!(first.success);
    let board_before = session.board().clone();

    let rejected = session.make_move(Some(0), Some(0)).await;
    assert!(!rejected.success);
    assert!(!rejected.game_over);
    // O is still to move; the failed attempt does not consume the turn
    assert_eq!(rejected.current_player, Some(Mark::O));
    assert_eq!(session.board(), &board_before);
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_coordinates_rejected() {
    let mut session = random_session("bounds");
    let outcome = session.make_move(Some(3), Some(0)).await;
    assert!(!outcome.success);
    assert_eq!(session.history().len(), 0);
    assert_eq!(session.current_player(), Some(Mark::X));
}

#[tokio::test]
async fn test_marks_strictly_alternate() {
    let mut session = random_session("alternation");
    let expected = [Mark::X, Mark::O, Mark::X, Mark::O, Mark::X];

    // A move order that cannot finish the game in five moves
    let moves = [(1, 1), (0, 0), (0, 2), (2, 0), (1, 0)];
    for (i, (row, col)) in moves.into_iter().enumerate() {
        assert_eq!(session.current_player(), Some(expected[i]));
        let outcome = session.make_move(Some(row), Some(col)).await;
        assert!(outcome.success);
        assert_eq!(session.history()[i].player, expected[i]);
    }
}

#[tokio::test]
async fn test_move_on_finished_game_is_noop() {
    let mut session = random_session("terminal");
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        session.make_move(Some(row), Some(col)).await;
    }
    assert_eq!(session.status(), GameStatus::Won(Mark::X));
    let history_len = session.history().len();

    let outcome = session.make_move(Some(2), Some(2)).await;
    assert!(!outcome.success);
    assert!(outcome.game_over);
    assert_eq!(outcome.winner, Some(Mark::X));
    assert_eq!(session.history().len(), history_len);
}

#[tokio::test]
async fn test_reset_restores_initial_state() {
    let mut session = random_session("reset");
    for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
        session.make_move(Some(row), Some(col)).await;
    }
    assert_eq!(session.status(), GameStatus::Won(Mark::X));

    session.reset();
    assert_eq!(session.status(), GameStatus::InProgress);
    assert_eq!(session.current_player(), Some(Mark::X));
    assert!(session.history().is_empty());
    assert_eq!(session.board().available_moves().len(), 9);
}

#[tokio::test]
async fn test_random_auto_play_reaches_terminal_state() {
    for i in 0..20 {
        let mut session = random_session(&format!("auto-{}", i));
        let outcome = session.play_to_completion().await;

        assert_ne!(session.status(), GameStatus::InProgress);
        assert!(outcome.winner.is_some() || outcome.is_draw);
        assert!(outcome.total_moves >= 5 && outcome.total_moves <= 9);
        assert_eq!(outcome.moves.len(), outcome.total_moves);
    }
}

#[tokio::test]
async fn test_manager_create_get_delete() {
    let manager = SessionManager::new(None);
    let created = manager.create(PlayerConfig::default(), PlayerConfig::default(), false);

    assert!(!created.state.game_over);
    assert_eq!(created.state.current_player, Some(Mark::X));
    assert_eq!(created.state.available_moves.len(), 9);

    let state = manager.get_state(&created.game_id).await.unwrap();
    assert_eq!(state.move_history.len(), 0);

    manager.delete(&created.game_id).unwrap();
    assert!(matches!(
        manager.get_state(&created.game_id).await,
        Err(SessionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_manager_unknown_id_is_not_found() {
    let manager = SessionManager::new(None);
    assert!(matches!(
        manager.make_move("missing", None, None).await,
        Err(SessionError::NotFound { .. })
    ));
    assert!(matches!(
        manager.delete("missing"),
        Err(SessionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_manager_auto_play_and_reset() {
    let manager = SessionManager::new(None);
    let created = manager.create(PlayerConfig::default(), PlayerConfig::default(), false);

    let outcome = manager.play_to_completion(&created.game_id).await.unwrap();
    assert!(outcome.winner.is_some() || outcome.is_draw);

    let state = manager.reset(&created.game_id).await.unwrap();
    assert!(!state.game_over);
    assert_eq!(state.current_player, Some(Mark::X));
    assert_eq!(state.available_moves.len(), 9);
}
