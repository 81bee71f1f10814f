// Command-line front end: argument parsing, progress output, and the
// leaderboard presenter.

pub mod cli;
pub mod progress;
pub mod table;
