//! Report rendering: board diagram, move list, turn label and summaries,
//! spliced into a templated document between paired delimiter markers.
//!
//! Splicing replaces only the text strictly between a begin/end pair and
//! preserves the markers themselves; a missing pair leaves that region
//! untouched. Replacement (not append) makes re-rendering idempotent.

use std::collections::BTreeMap;
use std::fmt::Write;

use shakmaty::{Chess, Color, File, Position, Rank, Role, Square};
use tracing::instrument;

use crate::game::GameRecord;

/// Begin marker for the board diagram.
pub const BOARD_BEGIN_MARKER: &str = "<!-- BEGIN CHESS BOARD -->";
/// End marker for the board diagram.
pub const BOARD_END_MARKER: &str = "<!-- END CHESS BOARD -->";
/// Begin marker for the full move list.
pub const MOVES_BEGIN_MARKER: &str = "<!-- BEGIN MOVE LIST -->";
/// End marker for the full move list.
pub const MOVES_END_MARKER: &str = "<!-- END MOVE LIST -->";
/// Begin marker for the active turn label.
pub const TURN_BEGIN_MARKER: &str = "<!-- BEGIN TURN -->";
/// End marker for the active turn label.
pub const TURN_END_MARKER: &str = "<!-- END TURN -->";
/// Begin marker for the recent-moves summary.
pub const LAST_MOVES_BEGIN_MARKER: &str = "<!-- BEGIN LAST MOVES -->";
/// End marker for the recent-moves summary.
pub const LAST_MOVES_END_MARKER: &str = "<!-- END LAST MOVES -->";
/// Begin marker for the contributor leaderboard.
pub const TOP_MOVERS_BEGIN_MARKER: &str = "<!-- BEGIN TOP MOVERS -->";
/// End marker for the contributor leaderboard.
pub const TOP_MOVERS_END_MARKER: &str = "<!-- END TOP MOVERS -->";

/// How many recent half-moves the summary shows.
const LAST_MOVES_SHOWN: usize = 5;
/// How many contributors the leaderboard shows.
const TOP_MOVERS_SHOWN: usize = 10;

/// Replaces the text strictly between `begin` and `end` in `original`.
///
/// The end marker is searched after the begin marker. If either marker is
/// missing the document is returned unchanged; the markers themselves are
/// always preserved.
pub fn replace_between(original: &str, begin: &str, end: &str, replacement: &str) -> String {
    let Some(start) = original.find(begin) else {
        return original.to_string();
    };
    let after_begin = start + begin.len();
    let Some(rel) = original[after_begin..].find(end) else {
        return original.to_string();
    };
    let end_start = after_begin + rel;

    let mut out = String::with_capacity(original.len() + replacement.len());
    out.push_str(&original[..after_begin]);
    out.push_str(replacement);
    out.push_str(&original[end_start..]);
    out
}

/// Renders the board as a markdown table, files A-H across, rank 8 at the
/// top, Unicode piece glyphs in the cells.
#[instrument(skip(pos))]
pub fn board_markdown(pos: &Chess) -> String {
    let board = pos.board();
    let mut out = String::with_capacity(512);

    out.push_str("|   | A | B | C | D | E | F | G | H |\n");
    out.push_str("| - | - | - | - | - | - | - | - | - |\n");

    for rank in (0..8u32).rev() {
        let _ = write!(out, "| {} |", rank + 1);
        for file in 0..8u32 {
            let square = Square::from_coords(File::new(file), Rank::new(rank));
            let glyph = board.piece_at(square).map_or(' ', piece_glyph);
            let _ = write!(out, " {} |", glyph);
        }
        out.push('\n');
    }

    out
}

fn piece_glyph(piece: shakmaty::Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

/// Renders the ordered move list as a markdown table of full moves.
pub fn moves_table(record: &GameRecord) -> String {
    let mut out = String::new();
    out.push_str("| Move | White | Black |\n");
    out.push_str("| ---- | ----- | ----- |\n");

    for (number, pair) in record.moves().chunks(2).enumerate() {
        let white = pair[0].san();
        let black = pair.get(1).map_or("", |m| m.san().as_str());
        let _ = writeln!(out, "| {} | {} | {} |", number + 1, white, black);
    }

    out
}

/// The side to move, `"white"` or `"black"`.
pub fn turn_label(pos: &Chess) -> &'static str {
    match pos.turn() {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Renders the most recent half-moves, newest first, with their authors.
pub fn last_moves_list(record: &GameRecord) -> String {
    let mut out = String::new();

    for mv in record.moves().iter().rev().take(LAST_MOVES_SHOWN) {
        match mv.author() {
            Some(author) => {
                let _ = writeln!(out, "- `{}` by {}", mv.san(), author);
            }
            None => {
                let _ = writeln!(out, "- `{}`", mv.san());
            }
        }
    }

    out
}

/// Renders the contributor leaderboard: author against half-moves
/// contributed, descending, ties broken alphabetically.
pub fn top_movers_table(record: &GameRecord) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for mv in record.moves() {
        if let Some(author) = mv.author() {
            *counts.entry(author.as_str()).or_default() += 1;
        }
    }

    // BTreeMap gives the alphabetical tie-break for free after the sort.
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut out = String::new();
    out.push_str("| Player | Moves |\n");
    out.push_str("| ------ | ----- |\n");
    for (author, moves) in ranked.into_iter().take(TOP_MOVERS_SHOWN) {
        let _ = writeln!(out, "| {} | {} |", author, moves);
    }

    out
}

/// Splices all five fragments for `record`/`pos` into `document`.
#[instrument(skip(document, record, pos), fields(moves = record.moves().len()))]
pub fn render_report(document: &str, record: &GameRecord, pos: &Chess) -> String {
    let board = format!("\n{}", board_markdown(pos));
    let moves = format!("\n{}", moves_table(record));
    let turn = turn_label(pos);
    let last_moves = format!("\n{}", last_moves_list(record));
    let top_movers = format!("\n{}", top_movers_table(record));

    let text = replace_between(document, BOARD_BEGIN_MARKER, BOARD_END_MARKER, &board);
    let text = replace_between(&text, MOVES_BEGIN_MARKER, MOVES_END_MARKER, &moves);
    let text = replace_between(&text, TURN_BEGIN_MARKER, TURN_END_MARKER, turn);
    let text = replace_between(
        &text,
        LAST_MOVES_BEGIN_MARKER,
        LAST_MOVES_END_MARKER,
        &last_moves,
    );
    replace_between(
        &text,
        TOP_MOVERS_BEGIN_MARKER,
        TOP_MOVERS_END_MARKER,
        &top_movers,
    )
}
