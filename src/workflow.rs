//! The per-invocation state machine.
//!
//! Given one parsed action and one issue, decides the transition, emits
//! tracker side effects in a fixed observable order (comment, then close),
//! and persists the game record exactly once, after all validation.
//! Tracker effects already flushed are not rolled back when a later step
//! fails; that asymmetry is part of the observable contract.

use chrono::Local;
use derive_getters::Getters;
use derive_more::{Display, Error};
use shakmaty::Position;
use tracing::{info, instrument, warn};

use crate::command::{Action, SquareName, parse_title};
use crate::config::Settings;
use crate::game::{EngineError, GameHeaders, GameRecord, MoveEngine, ReplayError};
use crate::store::{GameStore, StoreError};
use crate::tracker::{Issue, Tracker, TrackerError};

/// Everything that can abort an invocation.
#[derive(Debug, Display, Error)]
pub enum WorkflowError {
    /// The issue title matched neither command grammar.
    #[display("unknown command; the issue title could not be parsed")]
    UnknownCommand,
    /// A move was requested with no game in progress.
    #[display("there is no game in progress; start a new game first")]
    NoActiveGame,
    /// A non-owner tried to start a new game while one is active.
    #[display("a game is already in progress; only the repository owner can start a new one")]
    GameInProgress,
    /// The requested move is not in the legal-move set.
    #[display("move `{mv}` is invalid")]
    IllegalMove {
        /// The rejected move in coordinate notation.
        mv: String,
    },
    /// The move was legal but produced an invalid board.
    #[display("move rejected: the resulting board is invalid")]
    InvalidBoard,
    /// Storage failed.
    #[display("{}", _0)]
    Store(StoreError),
    /// The tracker could not be reached or rejected a request.
    #[display("{}", _0)]
    Tracker(TrackerError),
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<TrackerError> for WorkflowError {
    fn from(err: TrackerError) -> Self {
        Self::Tracker(err)
    }
}

impl From<ReplayError> for WorkflowError {
    fn from(err: ReplayError) -> Self {
        Self::Store(StoreError::from(err))
    }
}

/// What a completed invocation produced, for report rendering.
#[derive(Debug, Getters)]
pub struct Transition {
    /// The post-transition game record (already persisted, possibly
    /// archived).
    record: GameRecord,
    /// Whether the game reached a terminal board and was archived.
    archived: bool,
}

/// Orchestrates one invocation: one issue in, one transition out.
#[derive(Debug)]
pub struct GameWorkflow<T> {
    store: GameStore,
    tracker: T,
    settings: Settings,
    engine: MoveEngine,
}

impl<T: Tracker> GameWorkflow<T> {
    /// Creates a workflow over the given store, tracker and settings.
    pub fn new(store: GameStore, tracker: T, settings: Settings) -> Self {
        Self {
            store,
            tracker,
            settings,
            engine: MoveEngine::new(),
        }
    }

    /// Processes one issue to completion or failure.
    ///
    /// # Errors
    ///
    /// Every abort path of the taxonomy in [`WorkflowError`]. No error
    /// leaves a partially applied move behind: the persisted record is
    /// either the old value or the fully new one.
    #[instrument(skip(self, issue), fields(issue = issue.number, author = %issue.author, title = %issue.title))]
    pub async fn process(&self, issue: &Issue) -> Result<Transition, WorkflowError> {
        let mention = format!("@{}", issue.author);

        match parse_title(&issue.title) {
            Action::NewGame => self.start_new_game(issue, &mention).await,
            Action::Move { source, dest } => self.play_move(issue, &mention, source, dest).await,
            Action::Unknown => {
                warn!("Unrecognized command");
                self.tracker
                    .post_comment(
                        issue.number,
                        &format!(
                            "{} Sorry, I can't understand the command. \
                             Please try again and do not modify the issue title!",
                            mention
                        ),
                    )
                    .await?;
                self.tracker.close_issue(issue.number).await?;
                Err(WorkflowError::UnknownCommand)
            }
        }
    }

    /// `NewGame` transition. From the empty state this creates a fresh
    /// record; with a game in progress only the owner may proceed, and
    /// doing so discards the current game (observed behavior, preserved).
    async fn start_new_game(
        &self,
        issue: &Issue,
        mention: &str,
    ) -> Result<Transition, WorkflowError> {
        if self.store.has_current() && issue.author != *self.settings.owner() {
            // Guard fires before any side effect is emitted.
            return Err(WorkflowError::GameInProgress);
        }

        info!("Starting new game");
        self.tracker
            .post_comment(
                issue.number,
                &format!("{} done! New game successfully started!", mention),
            )
            .await?;
        self.tracker.close_issue(issue.number).await?;

        let headers = GameHeaders::new(
            self.settings.event_name(),
            self.settings.site_url(),
            Local::now().format("%Y.%m.%d").to_string(),
            "1".to_string(),
        );
        let record = GameRecord::new(headers);
        self.store.save_current(&record)?;

        Ok(Transition {
            record,
            archived: false,
        })
    }

    /// `Move` transition: load, delegate to the engine, report the verdict,
    /// and persist only on success. Terminal boards are archived at once.
    async fn play_move(
        &self,
        issue: &Issue,
        mention: &str,
        source: SquareName,
        dest: SquareName,
    ) -> Result<Transition, WorkflowError> {
        if !self.store.has_current() {
            return Err(WorkflowError::NoActiveGame);
        }

        let mut record = self.store.load_current()?;
        let board = record.board()?;
        let uci = format!("{}{}", source, dest);
        info!(mv = %uci, "Performing move");

        match self.engine.apply(&board, source, dest, &issue.author) {
            Err(EngineError::IllegalMove { mv }) => {
                warn!(mv = %mv, "Illegal move rejected");
                self.tracker
                    .post_comment(
                        issue.number,
                        &format!(
                            "{} Whaaaat? The move `{}` is invalid!\n\
                             Maybe someone squished a move before you. Please try again.",
                            mention, mv
                        ),
                    )
                    .await?;
                self.tracker.close_issue(issue.number).await?;
                Err(WorkflowError::IllegalMove { mv })
            }
            Err(EngineError::InvalidBoard) => {
                warn!("Move produced an invalid board");
                self.tracker
                    .post_comment(
                        issue.number,
                        &format!(
                            "{} Sorry, I can't perform the specified move. The board is invalid!",
                            mention
                        ),
                    )
                    .await?;
                self.tracker.close_issue(issue.number).await?;
                Err(WorkflowError::InvalidBoard)
            }
            Ok((next, mv)) => {
                self.tracker
                    .post_comment(
                        issue.number,
                        &format!(
                            "{} done! Successfully played move `{}` for current game.\n\
                             Thanks for playing!",
                            mention, uci
                        ),
                    )
                    .await?;
                self.tracker.close_issue(issue.number).await?;

                record.push(mv);
                record.set_result(next.outcome().to_string());
                self.store.save_current(&record)?;

                let archived = if next.is_game_over() {
                    let path = self.store.archive_current(Local::now())?;
                    info!(archive = %path.display(), "Game over; archived");
                    true
                } else {
                    false
                };

                Ok(Transition { record, archived })
            }
        }
    }
}
