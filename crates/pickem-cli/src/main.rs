// Pick'em standings entry point.
//
// Startup sequence:
// 1. Parse arguments, initialize tracing (log to file, not terminal)
// 2. Load config, apply the CLI group override
// 3. Open the week cache
// 4. Load the group roster
// 5. Acquire every player's weeks, printing progress to stderr
// 6. Compute standings
// 7. Print the leaderboard to stdout

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use pickem_cli::cli::Cli;
use pickem_cli::{progress, table};
use pickem_core::config;
use pickem_core::db::Database;
use pickem_nfl::NflPickemSite;
use pickem_standings::acquisition;
use pickem_standings::cache::{MemoryCache, WeekCache};
use pickem_standings::fetch::RosterSource;
use pickem_standings::model::SeasonRules;
use pickem_standings::standings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Arguments and tracing
    let cli = Cli::parse();
    init_tracing(&cli.base_dir)?;
    info!("pickem starting up");

    match run(cli).await {
        Ok(()) => {
            info!("pickem finished");
            Ok(())
        }
        Err(e) => {
            error!("run aborted: {e:#}");
            Err(e)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // 2. Config
    if let Some(path) = config::ensure_config_file(&cli.base_dir)? {
        info!("Wrote default config to {}", path.display());
    }
    let config = config::load_config_from(&cli.base_dir)
        .context("failed to load configuration")?
        .with_group_id(cli.group_id);
    info!(
        group = %config.group.id,
        concurrency = config.acquisition.concurrency,
        frontier = ?config.acquisition.frontier,
        "Config loaded"
    );

    // 3. Week cache
    let cache: Box<dyn WeekCache> = if cli.no_cache {
        info!("Week cache disabled");
        Box::new(MemoryCache::new())
    } else {
        let db = Database::open(&config.db_path).context("failed to open week cache")?;
        let cached = db.cached_week_count().context("failed to read week cache")?;
        info!(cached, "Week cache opened at {}", config.db_path.display());
        Box::new(db)
    };

    // 4. Roster
    let site = NflPickemSite::new(&config.source).context("failed to build HTTP client")?;
    let roster = site
        .roster(&config.group.id)
        .await
        .with_context(|| format!("failed to load roster for group {}", config.group.id))?;

    // 5. Acquisition
    let rules = SeasonRules::from(config.season);
    let players = acquisition::acquire_all(
        &roster,
        &site,
        cache.as_ref(),
        &rules,
        config.acquisition.concurrency,
        |player| eprint!("{}", progress::player_block(player)),
    )
    .await
    .context("failed to acquire weekly picks")?;

    // 6. Standings
    let standings = standings::compute_standings(&players, config.acquisition.frontier)
        .context("failed to compute standings")?;

    // 7. Output
    if cli.json {
        let json =
            serde_json::to_string_pretty(&standings).context("failed to serialize standings")?;
        println!("{json}");
    } else {
        print!("{}", table::render(&standings));
    }

    Ok(())
}

/// Initialize tracing to log to a file (stdout carries the leaderboard and
/// stderr the progress output).
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pickem.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pickem=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
