use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use driver_dashboard::cache::SqliteStore;
use driver_dashboard::config::{self, DashboardConfig, TOKEN_ENV};
use driver_dashboard::dashboard::{Dashboard, RefreshOutcome};
use driver_dashboard::driver::spec::default_drivers;
use driver_dashboard::logging;
use driver_dashboard::release::github::GitHubClient;
use driver_dashboard::release::types::RepoRef;
use driver_dashboard::report;
use driver_dashboard::support_table::{JsonFileSource, SupportedVersionsSource};

#[derive(Parser)]
#[command(name = "driver-dashboard")]
#[command(version, about = "Latest ScyllaDB driver releases against their upstream counterparts")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file mapping driver names to officially supported versions
    #[arg(long, global = true)]
    supported_versions: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the latest release of every driver
    Status {
        /// Ignore the cache and reload supported versions
        #[arg(long)]
        force: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the cached batch
    ClearCache,
    /// Check access to a repository's releases and the remaining quota
    Probe {
        /// Repository as owner/name
        repo: RepoRef,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&config::log_path(), cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DashboardConfig::load(cli.config.as_deref())?
        .with_env_token(std::env::var(TOKEN_ENV).ok());

    let client = Arc::new(
        GitHubClient::new(&config.github.base_url).with_token(config.github.token.clone()),
    );
    let supported_versions = cli
        .supported_versions
        .or_else(|| config.supported_versions_path.clone());

    match cli.command.unwrap_or(Command::Status {
        force: false,
        json: false,
    }) {
        Command::Probe { repo } => probe(&client, &repo).await,
        Command::ClearCache => {
            build_dashboard(&config, client, supported_versions)?.clear_cache()?;
            println!("Cache cleared");
            Ok(())
        }
        Command::Status { force, json } => {
            let dashboard = build_dashboard(&config, client, supported_versions)?;
            status(&dashboard, force, json).await
        }
    }
}

fn build_dashboard(
    config: &DashboardConfig,
    client: Arc<GitHubClient>,
    supported_versions: Option<PathBuf>,
) -> anyhow::Result<Dashboard> {
    std::fs::create_dir_all(config::data_dir())?;
    let store = Arc::new(SqliteStore::new(&config::db_path())?);

    let dashboard = Dashboard::new(client, store, default_drivers())
        .with_timeouts(config.timeouts.clone())
        .with_cache_ttl(config.cache.ttl_ms);

    Ok(match supported_versions {
        Some(path) => {
            let source: Arc<dyn SupportedVersionsSource> = Arc::new(JsonFileSource::new(path));
            dashboard.with_support_source(source)
        }
        None => dashboard,
    })
}

async fn status(dashboard: &Dashboard, force: bool, json: bool) -> anyhow::Result<()> {
    // A forced refresh reloads the table itself
    if !force {
        dashboard.reload_supported_versions().await;
    }

    let outcome = dashboard.refresh(force).await?;
    let Some(results) = outcome.results() else {
        println!("Refresh already in progress");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    print!(
        "{}",
        report::render(results, &dashboard.supported_versions(), Utc::now())
    );
    if let RefreshOutcome::Cached { age_ms, .. } = &outcome {
        println!("(from cache, {} minutes old)", age_ms / 60_000);
    }
    Ok(())
}

async fn probe(client: &GitHubClient, repo: &RepoRef) -> anyhow::Result<()> {
    let report = client.probe(repo).await?;
    let remaining = report
        .rate_limit
        .remaining
        .map_or_else(|| "unknown".to_string(), |r| r.to_string());
    let releases = report
        .release_count
        .map_or_else(|| "n/a".to_string(), |c| c.to_string());

    println!(
        "{}: status {}, rate limit remaining {}, releases {}",
        repo, report.status, remaining, releases
    );
    Ok(())
}
