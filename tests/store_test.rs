//! Tests for the file-backed game store.

use chess_clerk::{GameHeaders, GameRecord, GameStore, MoveRecord, StoreError};
use chrono::TimeZone;
use shakmaty::{EnPassantMode, fen::Fen};
use tempfile::TempDir;

/// Creates an empty games directory and a store rooted in it. The
/// directory handle must stay in scope to keep the files alive.
fn setup_store() -> (TempDir, GameStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = GameStore::new(dir.path().join("games"));
    (dir, store)
}

fn sample_record() -> GameRecord {
    let headers = GameHeaders::new(
        "alice's Online Open Chess Tournament".to_string(),
        "https://github.com/alice/chess".to_string(),
        "2026.08.30".to_string(),
        "1".to_string(),
    );
    let mut record = GameRecord::new(headers);
    record.push(MoveRecord::new("e4".to_string(), Some("@alice".to_string())));
    record.push(MoveRecord::new("e5".to_string(), Some("@bob".to_string())));
    record
}

#[test]
fn test_has_current_false_on_empty_store() {
    let (_dir, store) = setup_store();
    assert!(!store.has_current());
}

#[test]
fn test_load_current_without_game_fails() {
    let (_dir, store) = setup_store();
    assert!(matches!(
        store.load_current(),
        Err(StoreError::NoActiveGame)
    ));
}

#[test]
fn test_save_then_load_round_trips_record_and_board() {
    let (_dir, store) = setup_store();
    let record = sample_record();
    store.save_current(&record).expect("Save failed");
    assert!(store.has_current());

    let loaded = store.load_current().expect("Load failed");
    assert_eq!(loaded, record);

    let original = record.board().expect("Replay failed");
    let reloaded = loaded.board().expect("Replay failed");
    assert_eq!(
        Fen::from_position(&original, EnPassantMode::Legal).to_string(),
        Fen::from_position(&reloaded, EnPassantMode::Legal).to_string(),
    );
}

#[test]
fn test_save_overwrites_previous_record() {
    let (_dir, store) = setup_store();
    store.save_current(&sample_record()).expect("Save failed");

    let mut replacement = sample_record();
    replacement.push(MoveRecord::new("Nf3".to_string(), None));
    store.save_current(&replacement).expect("Save failed");

    let loaded = store.load_current().expect("Load failed");
    assert_eq!(loaded.moves().len(), 3);
}

#[test]
fn test_load_rejects_corrupt_pgn() {
    let (_dir, store) = setup_store();
    store.save_current(&sample_record()).expect("Save failed");
    // Well-formed SAN that cannot be replayed: white has no king move to e8.
    std::fs::write(store.current_path(), "1. e4 e5 2. Ke8 *\n").expect("Write failed");

    assert!(matches!(store.load_current(), Err(StoreError::Parse { .. })));
}

#[test]
fn test_archive_empties_current_slot_and_keeps_content() {
    let (_dir, store) = setup_store();
    let record = sample_record();
    store.save_current(&record).expect("Save failed");

    let timestamp = chrono::Local
        .with_ymd_and_hms(2026, 8, 30, 12, 0, 0)
        .unwrap();
    let archive = store.archive_current(timestamp).expect("Archive failed");

    assert!(!store.has_current());
    assert!(archive.ends_with("game-20260830-120000.pgn"));

    let text = std::fs::read_to_string(&archive).expect("Read failed");
    let archived = GameRecord::from_pgn(&text).expect("Decode failed");
    assert_eq!(archived, record);
}

#[test]
fn test_archive_same_second_gets_numeric_suffix() {
    let (_dir, store) = setup_store();
    let timestamp = chrono::Local
        .with_ymd_and_hms(2026, 8, 30, 12, 0, 0)
        .unwrap();

    store.save_current(&sample_record()).expect("Save failed");
    let first = store.archive_current(timestamp).expect("Archive failed");

    store.save_current(&sample_record()).expect("Save failed");
    let second = store.archive_current(timestamp).expect("Archive failed");

    assert!(first.ends_with("game-20260830-120000.pgn"));
    assert!(second.ends_with("game-20260830-120000-2.pgn"));
    assert!(first.exists());
    assert!(second.exists());
}

#[test]
fn test_archive_without_current_game_fails() {
    let (_dir, store) = setup_store();
    let timestamp = chrono::Local
        .with_ymd_and_hms(2026, 8, 30, 12, 0, 0)
        .unwrap();
    assert!(matches!(
        store.archive_current(timestamp),
        Err(StoreError::NoActiveGame)
    ));
}
