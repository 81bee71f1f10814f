// Configuration loading and parsing (config/pickem.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shipped default configuration, written to `config/pickem.toml` when the
/// file does not exist yet.
pub const DEFAULT_CONFIG: &str = include_str!("../../../defaults/pickem.toml");

/// Group used when neither the CLI nor the config file names one.
pub const DEFAULT_GROUP_ID: &str = "185836";

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "pickem.toml";
const CACHE_FILE: &str = "week-cache.db";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to write default config to {path}: {source}")]
    DefaultsWriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub group: GroupConfig,
    pub source: SourceConfig,
    pub season: SeasonConfig,
    pub acquisition: AcquisitionConfig,
    /// Resolved location of the week cache database.
    pub db_path: PathBuf,
}

impl Config {
    /// Replace the configured group with one supplied at the command line.
    pub fn with_group_id(mut self, group_id: Option<String>) -> Self {
        if let Some(id) = group_id {
            self.group.id = id;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// pickem.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pickem.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    group: GroupConfig,
    source: SourceConfig,
    #[serde(default)]
    season: SeasonConfig,
    #[serde(default)]
    acquisition: AcquisitionConfig,
    #[serde(default)]
    database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub id: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_GROUP_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SeasonConfig {
    /// Last week whose correct picks count toward standings points.
    pub regular_season_weeks: u32,
    /// Acquisition stops probing after this week regardless of results.
    pub max_weeks: u32,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            regular_season_weeks: 17,
            max_weeks: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Number of players whose weeks are acquired at the same time.
    pub concurrency: usize,
    pub frontier: FrontierPolicy,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            frontier: FrontierPolicy::default(),
        }
    }
}

/// How the standings engine treats players whose acquisition stopped at
/// different week counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontierPolicy {
    /// Refuse to rank; unequal week counts are an error.
    #[default]
    Strict,
    /// Rank only the weeks every player has data for.
    Truncate,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pickem.toml` relative to `base_dir`.
///
/// Does not create the file; see [`ensure_config_file`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(CONFIG_DIR).join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse config text. `path` is only used for error reporting.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let db_path = match file.database.path {
        Some(p) => PathBuf::from(p),
        None => default_db_path(),
    };

    let config = Config {
        group: file.group,
        source: file.source,
        season: file.season,
        acquisition: file.acquisition,
        db_path,
    };

    validate(&config)?;

    Ok(config)
}

/// Write the shipped defaults to `config/pickem.toml` if the file is missing.
/// Returns the path when a file was written, `None` if one already existed.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join(CONFIG_DIR);
    let target = config_dir.join(CONFIG_FILE);

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsWriteError {
        path: config_dir.clone(),
        source: e,
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsWriteError {
                    path: target.clone(),
                    source: e,
                }
            })?;
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsWriteError {
            path: target,
            source: e,
        }),
    }
}

/// Convenience wrapper: loads config relative to the current working directory,
/// writing the defaults first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Platform data directory, or the working directory when there is none
/// (e.g. no home directory).
fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "pickem", "pickem")
        .map(|dirs| dirs.data_dir().join(CACHE_FILE))
        .unwrap_or_else(|| PathBuf::from(CACHE_FILE))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.group.id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "group.id".into(),
            message: "must not be empty".into(),
        });
    }

    if config.source.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.base_url".into(),
            message: "must not be empty".into(),
        });
    }

    let numeric_fields: &[(&str, u64)] = &[
        ("source.timeout_secs", config.source.timeout_secs),
        (
            "season.regular_season_weeks",
            config.season.regular_season_weeks.into(),
        ),
        ("season.max_weeks", config.season.max_weeks.into()),
        (
            "acquisition.concurrency",
            config.acquisition.concurrency as u64,
        ),
    ];
    for (name, val) in numeric_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
