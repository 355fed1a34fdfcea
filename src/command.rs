//! Issue title parsing: turns free-text commands into typed actions.

use derive_more::Display;
use tracing::{debug, instrument};

/// A validated board square name: file letter `a`-`h` plus rank digit
/// `1`-`8`, always stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}{}", file, rank)]
pub struct SquareName {
    file: char,
    rank: char,
}

impl SquareName {
    /// Parses a two-character square name, accepting either letter case.
    /// Returns `None` for anything that is not a square on the board.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let file = chars.next()?.to_ascii_lowercase();
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        Some(Self { file, rank })
    }

    /// File letter, `a`-`h`.
    pub fn file(&self) -> char {
        self.file
    }

    /// Rank digit, `1`-`8`.
    pub fn rank(&self) -> char {
        self.rank
    }
}

/// The parsed intent of an incoming issue title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a fresh game, discarding nothing unless the guard allows it.
    NewGame,
    /// Play a move from `source` to `dest`.
    Move {
        /// Square the piece moves from.
        source: SquareName,
        /// Square the piece moves to.
        dest: SquareName,
    },
    /// Anything that matched neither grammar.
    Unknown,
}

/// Parses an issue title into an [`Action`].
///
/// Case-insensitive. `"chess: start new game"` must match the whole title;
/// a move command only needs to contain `"chess: move"` followed by
/// `<square> to <square>`. Unmatched input yields [`Action::Unknown`]
/// rather than an error; the caller decides how to react.
#[instrument]
pub fn parse_title(title: &str) -> Action {
    let lower = title.to_lowercase();

    if lower == "chess: start new game" {
        debug!("Parsed new-game command");
        return Action::NewGame;
    }

    if let Some(idx) = lower.find("chess: move") {
        let rest = &lower[idx + "chess: move".len()..];
        let mut words = rest.split_whitespace();
        if let (Some(src), Some(kw), Some(dst)) = (words.next(), words.next(), words.next())
            && kw == "to"
            && let (Some(source), Some(dest)) = (SquareName::parse(src), SquareName::parse(dst))
        {
            debug!(%source, %dest, "Parsed move command");
            return Action::Move { source, dest };
        }
    }

    debug!("Unrecognized command");
    Action::Unknown
}
