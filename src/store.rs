//! Durable storage for the single current game and its archive.
//!
//! One distinguished slot (`current.pgn`) holds the in-progress game; a
//! completed game is relocated to a timestamp-named archive slot and is
//! immutable from then on.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

use crate::game::{GameRecord, ReplayError};

/// Storage error for the game slots.
#[derive(Debug, Clone, Display, Error)]
pub enum StoreError {
    /// No current-game record exists.
    #[display("there is no game in progress")]
    NoActiveGame,
    /// Reading or writing a slot failed.
    #[display("game storage failed: {message}")]
    Io {
        /// Underlying I/O failure.
        message: String,
    },
    /// The stored game did not decode or replay cleanly.
    #[display("stored game is corrupt: {message}")]
    Parse {
        /// What went wrong while decoding or replaying.
        message: String,
    },
}

impl From<ReplayError> for StoreError {
    fn from(err: ReplayError) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// File-backed store for the current game and its archive slots.
#[derive(Debug, Clone)]
pub struct GameStore {
    games_dir: PathBuf,
}

impl GameStore {
    /// Creates a store rooted at `games_dir`. The directory is created
    /// lazily on the first save.
    pub fn new(games_dir: PathBuf) -> Self {
        Self { games_dir }
    }

    /// Path of the distinguished current-game slot.
    pub fn current_path(&self) -> PathBuf {
        self.games_dir.join("current.pgn")
    }

    /// True iff a current-game record exists.
    #[instrument(skip(self))]
    pub fn has_current(&self) -> bool {
        self.current_path().exists()
    }

    /// Loads the current game and verifies it replays cleanly.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoActiveGame`] when the slot is empty;
    /// [`StoreError::Parse`] when the stored PGN does not decode or its
    /// move sequence does not replay.
    #[instrument(skip(self))]
    pub fn load_current(&self) -> Result<GameRecord, StoreError> {
        let path = self.current_path();
        debug!(path = %path.display(), "Loading current game");

        let text = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NoActiveGame
            } else {
                StoreError::Io {
                    message: format!("read {}: {}", path.display(), e),
                }
            }
        })?;

        let record = GameRecord::from_pgn(&text).map_err(|e| StoreError::Parse {
            message: e.to_string(),
        })?;
        // Replaying here keeps the board/move-sequence invariant checked at
        // the storage boundary.
        record.board()?;

        info!(moves = record.moves().len(), "Current game loaded");
        Ok(record)
    }

    /// Saves `record` into the current slot, atomically from the caller's
    /// perspective: the slot holds either the old record or the new one.
    #[instrument(skip(self, record), fields(moves = record.moves().len()))]
    pub fn save_current(&self, record: &GameRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.games_dir).map_err(|e| StoreError::Io {
            message: format!("create {}: {}", self.games_dir.display(), e),
        })?;

        let path = self.current_path();
        let tmp = self.games_dir.join("current.pgn.tmp");

        fs::write(&tmp, record.to_pgn()).map_err(|e| StoreError::Io {
            message: format!("write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::Io {
            message: format!("rename {} -> {}: {}", tmp.display(), path.display(), e),
        })?;

        info!(path = %path.display(), "Current game saved");
        Ok(())
    }

    /// Relocates the current slot to a timestamp-named archive slot and
    /// returns the archive path. The current slot becomes empty.
    ///
    /// Archive names carry second resolution; if two games complete within
    /// the same second a numeric suffix is appended instead of clobbering.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoActiveGame`] when there is nothing to archive. The
    /// caller is expected to check game-over first.
    #[instrument(skip(self), fields(timestamp = %timestamp.format("%Y%m%d-%H%M%S")))]
    pub fn archive_current(&self, timestamp: DateTime<Local>) -> Result<PathBuf, StoreError> {
        let current = self.current_path();
        if !current.exists() {
            return Err(StoreError::NoActiveGame);
        }

        let base = timestamp.format("game-%Y%m%d-%H%M%S").to_string();
        let archive = self.free_archive_path(&base);

        fs::rename(&current, &archive).map_err(|e| StoreError::Io {
            message: format!(
                "rename {} -> {}: {}",
                current.display(),
                archive.display(),
                e
            ),
        })?;

        info!(archive = %archive.display(), "Game archived");
        Ok(archive)
    }

    fn free_archive_path(&self, base: &str) -> PathBuf {
        let candidate = self.games_dir.join(format!("{}.pgn", base));
        if !candidate.exists() {
            return candidate;
        }
        let mut counter = 2u32;
        loop {
            let candidate = self.games_dir.join(format!("{}-{}.pgn", base, counter));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// The directory this store is rooted at.
    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }
}
