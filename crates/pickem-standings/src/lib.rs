// Standings engine: weekly pick acquisition and tie-aware ranking.

pub mod acquisition;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod model;
pub mod standings;

pub use pickem_core::config::FrontierPolicy;
