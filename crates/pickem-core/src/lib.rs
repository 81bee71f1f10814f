// Shared infrastructure: configuration loading and SQLite persistence.

pub mod config;
pub mod db;
