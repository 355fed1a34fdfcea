//! Command-line interface for chess_clerk.

use clap::Parser;
use std::path::PathBuf;

/// Chess Clerk - plays one issue-tracker chess command per run
#[derive(Parser, Debug)]
#[command(name = "chess_clerk")]
#[command(about = "Processes one chess command from an issue tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the current game and archived games
    #[arg(long, default_value = "games")]
    pub games_dir: PathBuf,

    /// Templated document the rendered report is spliced into
    #[arg(long, default_value = "README.md")]
    pub readme: PathBuf,
}
