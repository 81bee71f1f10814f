// Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Leaderboard for an NFL weekly pick'em group
#[derive(Debug, Parser)]
#[command(name = "pickem", version)]
pub struct Cli {
    /// Pick'em group id; overrides `[group] id` in the config file
    pub group_id: Option<String>,

    /// Directory containing config/pickem.toml (created on first run)
    #[arg(short = 'C', long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Print the standings as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Neither read nor write the week cache
    #[arg(long)]
    pub no_cache: bool,
}
