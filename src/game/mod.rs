//! Game state: records, PGN serialization, and the move engine.

mod engine;
mod pgn;
mod record;

pub use engine::{EngineError, MoveEngine};
pub use pgn::PgnError;
pub use record::{GameHeaders, GameRecord, MoveRecord, ReplayError};
