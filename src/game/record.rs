//! The persisted unit of truth: headers plus an annotated move sequence.
//!
//! Board state is never stored. It is always the replay of the move
//! sequence from the standard initial position, so the two cannot diverge.

use derive_getters::Getters;
use derive_more::{Display, Error};
use shakmaty::{Chess, Position, san::SanPlus};
use tracing::instrument;

/// PGN tag-roster headers tracked for a game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameHeaders {
    /// Tournament event name.
    event: String,
    /// Site URL.
    site: String,
    /// Creation date, `YYYY.MM.DD`.
    date: String,
    /// Round, always `"1"` for a fresh game.
    round: String,
    /// Game result marker: `1-0`, `0-1`, `1/2-1/2` or `*`.
    result: String,
}

impl GameHeaders {
    /// Creates headers for a fresh game. The result starts undecided.
    pub fn new(event: String, site: String, date: String, round: String) -> Self {
        Self {
            event,
            site,
            date,
            round,
            result: "*".to_string(),
        }
    }

    /// Creates headers from all five fields, as read back from storage.
    pub fn from_parts(
        event: String,
        site: String,
        date: String,
        round: String,
        result: String,
    ) -> Self {
        Self {
            event,
            site,
            date,
            round,
            result,
        }
    }

    pub(crate) fn set_result(&mut self, result: String) {
        self.result = result;
    }
}

/// One applied move: SAN text plus the handle of whoever requested it.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveRecord {
    /// The move in standard algebraic notation.
    san: String,
    /// Requesting author's handle, including the leading `@`, if known.
    author: Option<String>,
}

impl MoveRecord {
    /// Creates a move record.
    pub fn new(san: String, author: Option<String>) -> Self {
        Self { san, author }
    }

    pub(crate) fn set_author(&mut self, author: String) {
        self.author = Some(author);
    }
}

/// The single persisted game: headers plus the ordered move sequence.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameRecord {
    /// Event/site/date/round/result metadata.
    headers: GameHeaders,
    /// Applied moves in order, each optionally annotated with an author.
    moves: Vec<MoveRecord>,
}

impl GameRecord {
    /// Creates a fresh record with no moves played.
    pub fn new(headers: GameHeaders) -> Self {
        Self {
            headers,
            moves: Vec::new(),
        }
    }

    /// Creates a record from parts, as read back from storage.
    pub fn from_parts(headers: GameHeaders, moves: Vec<MoveRecord>) -> Self {
        Self { headers, moves }
    }

    /// Appends an applied move to the sequence.
    pub fn push(&mut self, mv: MoveRecord) {
        self.moves.push(mv);
    }

    pub(crate) fn set_result(&mut self, result: String) {
        self.headers.set_result(result);
    }

    /// Reconstructs the board by replaying the move sequence from the
    /// standard initial position.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] when a stored move does not parse as SAN or
    /// is not playable in the position it was recorded against. That only
    /// happens when the stored game was corrupted outside this program.
    #[instrument(skip(self), fields(moves = self.moves.len()))]
    pub fn board(&self) -> Result<Chess, ReplayError> {
        let mut pos = Chess::default();

        for (ply, mv) in self.moves.iter().enumerate() {
            let san: SanPlus = mv.san.parse().map_err(|e| {
                ReplayError::new(format!("ply {}: `{}` is not SAN: {}", ply + 1, mv.san, e))
            })?;
            let m = san.san.to_move(&pos).map_err(|e| {
                ReplayError::new(format!("ply {}: `{}` is not playable: {}", ply + 1, mv.san, e))
            })?;
            pos.play_unchecked(m);
        }

        Ok(pos)
    }
}

/// Replay error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Replay error: {} at {}:{}", message, file, line)]
pub struct ReplayError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl ReplayError {
    /// Creates a new replay error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{EnPassantMode, fen::Fen};

    fn headers() -> GameHeaders {
        GameHeaders::new(
            "Test Event".to_string(),
            "https://example.com".to_string(),
            "2026.01.01".to_string(),
            "1".to_string(),
        )
    }

    #[test]
    fn test_empty_record_replays_to_initial_position() {
        let record = GameRecord::new(headers());
        let pos = record.board().expect("Replay failed");
        let fen = Fen::from_position(&pos, EnPassantMode::Legal).to_string();
        assert!(fen.starts_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"));
    }

    #[test]
    fn test_replay_applies_moves_in_order() {
        let mut record = GameRecord::new(headers());
        record.push(MoveRecord::new("e4".to_string(), Some("@alice".to_string())));
        record.push(MoveRecord::new("e5".to_string(), Some("@bob".to_string())));

        let pos = record.board().expect("Replay failed");
        assert_eq!(pos.turn(), shakmaty::Color::White);
        let fen = Fen::from_position(&pos, EnPassantMode::Legal).to_string();
        assert!(fen.contains("4p3"), "black pawn should sit on e5: {}", fen);
    }

    #[test]
    fn test_replay_rejects_garbage_san() {
        let mut record = GameRecord::new(headers());
        record.push(MoveRecord::new("not-a-move".to_string(), None));
        assert!(record.board().is_err());
    }

    #[test]
    fn test_replay_rejects_unplayable_move() {
        let mut record = GameRecord::new(headers());
        // Legal SAN syntax, but no knight can reach e5 from the start.
        record.push(MoveRecord::new("Ne5".to_string(), None));
        assert!(record.board().is_err());
    }
}
