//! PGN serialization for [`GameRecord`].
//!
//! Encoding writes the tag section, numbered SAN movetext with per-move
//! `{ @author }` comments, and the trailing result marker. Decoding is a
//! streaming `pgn-reader` visitor.

use std::fmt::Write;
use std::ops::ControlFlow;

use derive_more::{Display, Error};
use pgn_reader::{Nag, Outcome, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use tracing::instrument;

use super::record::{GameHeaders, GameRecord, MoveRecord};

impl GameRecord {
    /// Serializes this record to PGN text.
    #[instrument(skip(self), fields(moves = self.moves().len()))]
    pub fn to_pgn(&self) -> String {
        let headers = self.headers();
        let mut out = String::with_capacity(256);

        let _ = writeln!(out, "[Event \"{}\"]", escape_tag(headers.event()));
        let _ = writeln!(out, "[Site \"{}\"]", escape_tag(headers.site()));
        let _ = writeln!(out, "[Date \"{}\"]", escape_tag(headers.date()));
        let _ = writeln!(out, "[Round \"{}\"]", escape_tag(headers.round()));
        let _ = writeln!(out, "[Result \"{}\"]", escape_tag(headers.result()));
        out.push('\n');

        let mut movetext = String::with_capacity(256);
        for (ply, mv) in self.moves().iter().enumerate() {
            if !movetext.is_empty() {
                movetext.push(' ');
            }
            if (ply as u32).is_multiple_of(2) {
                let _ = write!(movetext, "{}. ", ply / 2 + 1);
            }
            movetext.push_str(mv.san());
            if let Some(author) = mv.author() {
                let _ = write!(movetext, " {{ {} }}", author);
            }
        }

        if !movetext.is_empty() {
            movetext.push(' ');
        }
        movetext.push_str(headers.result());

        out.push_str(&movetext);
        out.push('\n');
        out
    }

    /// Deserializes a record from PGN text.
    ///
    /// # Errors
    ///
    /// Returns [`PgnError`] when the input holds no game or cannot be read.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn from_pgn(text: &str) -> Result<Self, PgnError> {
        let mut reader = Reader::new(text.as_bytes());
        let mut visitor = RecordVisitor::default();

        reader
            .read_game(&mut visitor)
            .map_err(|e| PgnError::new(format!("PGN read failed: {}", e)))?
            .ok_or_else(|| PgnError::new("no game found in PGN input".to_string()))?;

        let result = visitor
            .outcome_marker
            .or(visitor.result_tag)
            .unwrap_or_else(|| "*".to_string());

        let headers = GameHeaders::from_parts(
            visitor.event.unwrap_or_else(|| "?".to_string()),
            visitor.site.unwrap_or_else(|| "?".to_string()),
            visitor.date.unwrap_or_else(|| "????.??.??".to_string()),
            visitor.round.unwrap_or_else(|| "?".to_string()),
            result,
        );

        Ok(GameRecord::from_parts(headers, visitor.moves))
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Captures tags, mainline SAN and per-move comments into record parts.
#[derive(Default)]
struct RecordVisitor {
    event: Option<String>,
    site: Option<String>,
    date: Option<String>,
    round: Option<String>,
    result_tag: Option<String>,
    outcome_marker: Option<String>,
    moves: Vec<MoveRecord>,
}

impl RecordVisitor {
    fn set_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot = match key {
            b"Event" => &mut self.event,
            b"Site" => &mut self.site,
            b"Date" => &mut self.date,
            b"Round" => &mut self.round,
            b"Result" => &mut self.result_tag,
            _ => return,
        };
        if slot.is_none() {
            let raw = String::from_utf8_lossy(value.as_bytes());
            *slot = Some(raw.replace("\\\"", "\"").replace("\\\\", "\\"));
        }
    }
}

impl Visitor for RecordVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        *self = Self::default();
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        self.set_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        self.moves.push(MoveRecord::new(san.to_string(), None));
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        _: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = String::from_utf8_lossy(comment.as_bytes()).trim().to_string();
        if text.is_empty() {
            return ControlFlow::Continue(());
        }
        // A comment annotates the move it follows.
        if let Some(last) = self.moves.last_mut()
            && last.author().is_none()
        {
            last.set_author(text);
        }
        ControlFlow::Continue(())
    }

    fn outcome(
        &mut self,
        _: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        self.outcome_marker = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {}
}

/// PGN error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("PGN error: {} at {}:{}", message, file, line)]
pub struct PgnError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl PgnError {
    /// Creates a new PGN error.
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
        record.push(MoveRecord::new("Nf3".to_string(), None));
        record
    }

    #[test]
    fn test_encode_writes_tags_and_numbered_movetext() {
        let pgn = sample_record().to_pgn();
        assert!(pgn.contains("[Event \"alice's Online Open Chess Tournament\"]"));
        assert!(pgn.contains("[Round \"1\"]"));
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.contains("1. e4 { @alice } e5 { @bob } 2. Nf3 *"));
    }

    #[test]
    fn test_round_trip_preserves_moves_and_authors() {
        let record = sample_record();
        let decoded = GameRecord::from_pgn(&record.to_pgn()).expect("Decode failed");
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_reads_foreign_pgn() {
        let pgn = r#"[Event "Somewhere"]
[Site "Internet"]
[Date "2024.01.01"]
[Round "1"]
[Result "1-0"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0
"#;
        let record = GameRecord::from_pgn(pgn).expect("Decode failed");
        assert_eq!(record.moves().len(), 7);
        assert_eq!(record.headers().result(), "1-0");
        assert!(record.moves().iter().all(|m| m.author().is_none()));
    }

    #[test]
    fn test_decode_empty_movetext() {
        let pgn = "[Event \"Fresh\"]\n[Result \"*\"]\n\n*\n";
        let record = GameRecord::from_pgn(pgn).expect("Decode failed");
        assert!(record.moves().is_empty());
        assert_eq!(record.headers().result(), "*");
    }

    #[test]
    fn test_decode_rejects_empty_input() {
        assert!(GameRecord::from_pgn("").is_err());
    }

    #[test]
    fn test_escaped_quotes_survive_round_trip() {
        let headers = GameHeaders::new(
            "An \"Event\"".to_string(),
            "site".to_string(),
            "2026.01.01".to_string(),
            "1".to_string(),
        );
        let record = GameRecord::new(headers);
        let decoded = GameRecord::from_pgn(&record.to_pgn()).expect("Decode failed");
        assert_eq!(decoded.headers().event(), "An \"Event\"");
    }
}
