//! Chess Clerk - issue-tracker-driven chess, one command per invocation.
//!
//! Each run processes exactly one incoming command encoded as an issue
//! title, advances the single persisted game, and republishes the board as
//! rendered text.
//!
//! # Architecture
//!
//! - **Command**: issue title parsing into a typed action
//! - **Game**: the persisted record, PGN serialization and the move engine
//! - **Store**: the current-game slot and timestamped archive slots
//! - **Tracker**: the issue-tracking service behind a narrow trait
//! - **Workflow**: the per-invocation state machine tying it all together
//! - **Render**: report fragments spliced into the templated README
//!
//! # Example
//!
//! ```no_run
//! use chess_clerk::{GameStore, GameWorkflow, GithubTracker, Settings, Tracker};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let tracker = GithubTracker::new(
//!     settings.token().clone(),
//!     settings.owner().clone(),
//!     settings.repo().clone(),
//! );
//! let issue = tracker.fetch_issue(*settings.issue_number()).await?;
//!
//! let store = GameStore::new("games".into());
//! let workflow = GameWorkflow::new(store, tracker, settings);
//! let _transition = workflow.process(&issue).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod cli;
mod command;
mod config;
mod game;
mod render;
mod store;
mod tracker;
mod workflow;

// Crate-level exports - CLI
pub use cli::Cli;

// Crate-level exports - Command parsing
pub use command::{Action, SquareName, parse_title};

// Crate-level exports - Configuration
pub use config::{ConfigError, Settings};

// Crate-level exports - Game state
pub use game::{
    EngineError, GameHeaders, GameRecord, MoveEngine, MoveRecord, PgnError, ReplayError,
};

// Crate-level exports - Storage
pub use store::{GameStore, StoreError};

// Crate-level exports - Tracker
pub use tracker::{GithubTracker, Issue, Tracker, TrackerError};

// Crate-level exports - Workflow
pub use workflow::{GameWorkflow, Transition, WorkflowError};

// Crate-level exports - Rendering
pub use render::{
    BOARD_BEGIN_MARKER, BOARD_END_MARKER, LAST_MOVES_BEGIN_MARKER, LAST_MOVES_END_MARKER,
    MOVES_BEGIN_MARKER, MOVES_END_MARKER, TOP_MOVERS_BEGIN_MARKER, TOP_MOVERS_END_MARKER,
    TURN_BEGIN_MARKER, TURN_END_MARKER, board_markdown, last_moves_list, moves_table,
    render_report, replace_between, top_movers_table, turn_label,
};
