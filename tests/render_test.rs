//! Tests for report rendering against a full README template.

use chess_clerk::{
    BOARD_BEGIN_MARKER, BOARD_END_MARKER, GameHeaders, GameRecord, LAST_MOVES_BEGIN_MARKER,
    LAST_MOVES_END_MARKER, MOVES_BEGIN_MARKER, MOVES_END_MARKER, MoveRecord,
    TOP_MOVERS_BEGIN_MARKER, TOP_MOVERS_END_MARKER, TURN_BEGIN_MARKER, TURN_END_MARKER,
    render_report,
};

fn template() -> String {
    format!(
        "# Community Chess\n\n\
         ## Board\n{}\nstale board\n{}\n\n\
         It is currently {}?{}'s turn.\n\n\
         ## Moves\n{}\nstale moves\n{}\n\n\
         ## Recent\n{}\n{}\n\n\
         ## Leaderboard\n{}\n{}\n\n\
         Questions? Open an issue!\n",
        BOARD_BEGIN_MARKER,
        BOARD_END_MARKER,
        TURN_BEGIN_MARKER,
        TURN_END_MARKER,
        MOVES_BEGIN_MARKER,
        MOVES_END_MARKER,
        LAST_MOVES_BEGIN_MARKER,
        LAST_MOVES_END_MARKER,
        TOP_MOVERS_BEGIN_MARKER,
        TOP_MOVERS_END_MARKER,
    )
}

fn fresh_record() -> GameRecord {
    GameRecord::new(GameHeaders::new(
        "Event".to_string(),
        "site".to_string(),
        "2026.08.30".to_string(),
        "1".to_string(),
    ))
}

#[test]
fn test_fresh_game_reports_white_to_move_and_initial_board() {
    let record = fresh_record();
    let board = record.board().expect("Replay failed");

    let out = render_report(&template(), &record, &board);

    assert!(out.contains(&format!("{}white{}", TURN_BEGIN_MARKER, TURN_END_MARKER)));
    assert!(out.contains("| 8 | ♜ | ♞ | ♝ | ♛ | ♚ | ♝ | ♞ | ♜ |"));
    assert!(!out.contains("stale board"));
    assert!(!out.contains("stale moves"));
    assert!(out.contains("# Community Chess"));
    assert!(out.contains("Questions? Open an issue!"));
}

#[test]
fn test_two_moves_reflected_in_all_fragments() {
    let mut record = fresh_record();
    record.push(MoveRecord::new("e4".to_string(), Some("@bob".to_string())));
    record.push(MoveRecord::new("e5".to_string(), Some("@carol".to_string())));
    let board = record.board().expect("Replay failed");

    let out = render_report(&template(), &record, &board);

    assert!(out.contains(&format!("{}white{}", TURN_BEGIN_MARKER, TURN_END_MARKER)));
    assert!(out.contains("| 1 | e4 | e5 |"));
    assert!(out.contains("- `e5` by @carol"));
    assert!(out.contains("| @bob | 1 |"));
    // White pawn has left e2 and sits on e4.
    assert!(out.contains("| 4 |   |   |   |   | ♙ |   |   |   |"));
}

#[test]
fn test_rendering_twice_is_idempotent() {
    let record = fresh_record();
    let board = record.board().expect("Replay failed");

    let once = render_report(&template(), &record, &board);
    let twice = render_report(&once, &record, &board);
    assert_eq!(once, twice);
}

#[test]
fn test_document_without_markers_is_untouched() {
    let record = fresh_record();
    let board = record.board().expect("Replay failed");
    let plain = "# No markers here\n\nJust text.\n";

    assert_eq!(render_report(plain, &record, &board), plain);
}
