//! Move validation and application against the rules engine.

use derive_more::{Display, Error};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, fen::Fen, san::SanPlus, uci::UciMove};
use tracing::{debug, instrument};

use crate::command::SquareName;

use super::record::MoveRecord;

/// Why a requested move was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum EngineError {
    /// The move is not a member of the position's legal-move set.
    #[display("move `{mv}` is not legal in the current position")]
    IllegalMove {
        /// The rejected move in coordinate notation.
        mv: String,
    },
    /// The move was legal but the resulting board failed the validity
    /// check, so it was not committed.
    #[display("the resulting board failed the validity check")]
    InvalidBoard,
}

/// Validates and applies a single move against a position.
///
/// Delegates legality, application and board validity to the rules engine.
/// A bare source/destination pair carries no promotion piece; the rules
/// engine requires the promotion role to be explicit, so a pawn move onto
/// the last rank is reported as an illegal move rather than silently
/// promoted to a queen.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveEngine;

impl MoveEngine {
    /// Creates a move engine.
    pub fn new() -> Self {
        Self
    }

    /// Applies `source`→`dest` to `pos` on behalf of `author`.
    ///
    /// On success returns the updated position and the applied move in SAN,
    /// annotated with the requesting author's handle. On failure the input
    /// position is untouched.
    ///
    /// # Errors
    ///
    /// [`EngineError::IllegalMove`] when the move is not in the legal-move
    /// set; [`EngineError::InvalidBoard`] when the post-move board fails
    /// the rules engine's validity check.
    #[instrument(skip(self, pos), fields(%source, %dest, author = %author))]
    pub fn apply(
        &self,
        pos: &Chess,
        source: SquareName,
        dest: SquareName,
        author: &str,
    ) -> Result<(Chess, MoveRecord), EngineError> {
        let uci = format!("{}{}", source, dest);

        let parsed = UciMove::from_ascii(uci.as_bytes())
            .map_err(|_| EngineError::IllegalMove { mv: uci.clone() })?;
        let m = parsed
            .to_move(pos)
            .map_err(|_| EngineError::IllegalMove { mv: uci.clone() })?;
        if !pos.legal_moves().contains(&m) {
            return Err(EngineError::IllegalMove { mv: uci });
        }

        let mut next = pos.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut next, m);

        // Round-trip the setup through the rules engine to catch malformed
        // states before anything is committed.
        let fen = Fen::from_position(&next, EnPassantMode::Legal);
        fen.into_position::<Chess>(CastlingMode::Standard)
            .map_err(|_| EngineError::InvalidBoard)?;

        debug!(san = %san, "Move applied");
        let record = MoveRecord::new(san.to_string(), Some(format!("@{}", author)));
        Ok((next, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str) -> SquareName {
        SquareName::parse(name).expect("valid square")
    }

    #[test]
    fn test_opening_pawn_push_is_accepted() {
        let engine = MoveEngine::new();
        let (next, mv) = engine
            .apply(&Chess::default(), square("e2"), square("e4"), "alice")
            .expect("Apply failed");
        assert_eq!(mv.san(), "e4");
        assert_eq!(mv.author().as_deref(), Some("@alice"));
        assert_eq!(next.turn(), shakmaty::Color::Black);
    }

    #[test]
    fn test_blocked_pawn_jump_is_illegal() {
        let engine = MoveEngine::new();
        let err = engine
            .apply(&Chess::default(), square("a2"), square("a5"), "alice")
            .expect_err("a2a5 should be rejected");
        assert_eq!(
            err,
            EngineError::IllegalMove {
                mv: "a2a5".to_string()
            }
        );
    }

    #[test]
    fn test_moving_opponent_piece_is_illegal() {
        let engine = MoveEngine::new();
        let err = engine
            .apply(&Chess::default(), square("e7"), square("e5"), "alice")
            .expect_err("black's pawn cannot move on white's turn");
        assert!(matches!(err, EngineError::IllegalMove { .. }));
    }

    #[test]
    fn test_rejection_leaves_position_untouched() {
        let engine = MoveEngine::new();
        let pos = Chess::default();
        let before = pos.clone();
        let _ = engine.apply(&pos, square("a2"), square("a5"), "alice");
        assert_eq!(pos.legal_moves().len(), before.legal_moves().len());
    }
}
