//! Issue tracker access behind a narrow trait.
//!
//! The workflow only ever fetches one issue, posts one comment, and closes
//! one issue per invocation. Keeping that surface behind [`Tracker`] lets
//! tests substitute a recording double and assert effect ordering.

use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// An issue as fetched from the tracker: the event record driving one
/// invocation. Read-only for its duration.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Issue number.
    pub number: u64,
    /// Issue title, holding the command text.
    pub title: String,
    /// Login of the requesting user, without the leading `@`.
    pub author: String,
}

/// Narrow seam to the issue-tracking service.
#[async_trait]
pub trait Tracker {
    /// Fetches an issue by number.
    async fn fetch_issue(&self, number: u64) -> Result<Issue, TrackerError>;

    /// Posts a comment on an issue.
    async fn post_comment(&self, number: u64, body: &str) -> Result<(), TrackerError>;

    /// Closes an issue.
    async fn close_issue(&self, number: u64) -> Result<(), TrackerError>;
}

/// GitHub REST v3 implementation of [`Tracker`].
#[derive(Debug, Clone)]
pub struct GithubTracker {
    client: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct IssueWire {
    number: u64,
    title: String,
    user: UserWire,
}

#[derive(Debug, Deserialize)]
struct UserWire {
    login: String,
}

impl GithubTracker {
    /// Creates a tracker for `owner/repo` authenticated with `token`.
    #[instrument(skip(token), fields(owner = %owner, repo = %repo))]
    pub fn new(token: String, owner: String, repo: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            owner,
            repo,
            api_base: "https://api.github.com".to_string(),
        }
    }

    /// Overrides the API base URL; used against test servers.
    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }

    fn issue_url(&self, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, self.owner, self.repo, number
        )
    }

    fn decorate(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("User-Agent", "chess_clerk")
            .header("Accept", "application/vnd.github+json")
    }
}

#[async_trait]
impl Tracker for GithubTracker {
    #[instrument(skip(self))]
    async fn fetch_issue(&self, number: u64) -> Result<Issue, TrackerError> {
        let url = self.issue_url(number);
        debug!(url = %url, "Fetching issue");

        let response = self.decorate(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::new(format!("GET {} failed: {}", url, status)));
        }

        let wire: IssueWire = response.json().await?;
        info!(number = wire.number, author = %wire.user.login, "Issue fetched");
        Ok(Issue {
            number: wire.number,
            title: wire.title,
            author: wire.user.login,
        })
    }

    #[instrument(skip(self, body))]
    async fn post_comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
        let url = format!("{}/comments", self.issue_url(number));
        debug!(url = %url, "Posting comment");

        let response = self
            .decorate(self.client.post(&url))
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::new(format!(
                "POST {} failed: {}",
                url, status
            )));
        }

        info!(issue = number, "Comment posted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close_issue(&self, number: u64) -> Result<(), TrackerError> {
        let url = self.issue_url(number);
        debug!(url = %url, "Closing issue");

        let response = self
            .decorate(self.client.patch(&url))
            .json(&serde_json::json!({ "state": "closed" }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::new(format!(
                "PATCH {} failed: {}",
                url, status
            )));
        }

        info!(issue = number, "Issue closed");
        Ok(())
    }
}

/// Tracker error with caller location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Tracker error: {} at {}:{}", message, file, line)]
pub struct TrackerError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl TrackerError {
    /// Creates a new tracker error.
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

impl From<reqwest::Error> for TrackerError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP request failed: {}", err))
    }
}
