//! Chess Clerk - one issue-tracker chess command per run.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_clerk::{Cli, GameStore, GameWorkflow, GithubTracker, Settings, Tracker, render_report};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("configuration incomplete")?;

    let tracker = GithubTracker::new(
        settings.token().clone(),
        settings.owner().clone(),
        settings.repo().clone(),
    );
    let issue = tracker
        .fetch_issue(*settings.issue_number())
        .await
        .context("failed to fetch issue")?;
    info!(issue = issue.number, title = %issue.title, author = %issue.author, "Processing issue");

    let store = GameStore::new(cli.games_dir.clone());
    let workflow = GameWorkflow::new(store, tracker, settings);
    let transition = workflow.process(&issue).await?;

    let board = transition
        .record()
        .board()
        .context("replaying the saved game")?;
    let document = fs::read_to_string(&cli.readme)
        .with_context(|| format!("reading {}", cli.readme.display()))?;
    let updated = render_report(&document, transition.record(), &board);
    fs::write(&cli.readme, updated)
        .with_context(|| format!("writing {}", cli.readme.display()))?;

    info!(archived = *transition.archived(), "Report regenerated");
    Ok(())
}
