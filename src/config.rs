//! Environment-driven settings for a single invocation.

use derive_getters::Getters;
use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

/// Everything one invocation needs to know about the outside world:
/// tracker credentials, the issue to process, and repository coordinates.
#[derive(Debug, Clone, Getters)]
pub struct Settings {
    /// Access token for the issue tracker.
    token: String,
    /// Number of the issue to process.
    issue_number: u64,
    /// Repository owner; the only identity allowed to discard a game.
    owner: String,
    /// Repository name.
    repo: String,
}

impl Settings {
    /// Creates settings directly; used by tests and callers that already
    /// resolved their environment.
    pub fn new(token: String, issue_number: u64, owner: String, repo: String) -> Self {
        Self {
            token,
            issue_number,
            owner,
            repo,
        }
    }

    /// Loads settings from the environment.
    ///
    /// Requires `GH_ACCESS_TOKEN`, `ISSUE_NUMBER`, `GITHUB_USER` and
    /// `GITHUB_REPO_NAME`. Fails before any tracker interaction is
    /// possible, so a misconfigured run leaves no side effects.
    #[instrument]
    pub fn from_env() -> Result<Self, ConfigError> {
        debug!("Loading settings from environment");

        let token = require("GH_ACCESS_TOKEN")?;
        let issue_raw = require("ISSUE_NUMBER")?;
        let issue_number = issue_raw
            .parse::<u64>()
            .map_err(|e| ConfigError::new(format!("ISSUE_NUMBER is not a number: {}", e)))?;
        let owner = require("GITHUB_USER")?;
        let repo = require("GITHUB_REPO_NAME")?;

        info!(owner = %owner, repo = %repo, issue = issue_number, "Settings loaded");
        Ok(Self::new(token, issue_number, owner, repo))
    }

    /// Event name written into the headers of a fresh game.
    pub fn event_name(&self) -> String {
        format!("{}'s Online Open Chess Tournament", self.owner)
    }

    /// Site URL written into the headers of a fresh game.
    pub fn site_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .map_err(|_| ConfigError::new(format!("{} environment variable not set", key)))
}

/// Configuration error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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
