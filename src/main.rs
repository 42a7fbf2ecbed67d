//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirroring crawler.

use clap::Parser;
use site_mirror::config::{
    compute_settings_hash, load_config_with_hash, parse_duration, validate, Config,
};
use site_mirror::crawler::{CrawlOptions, Crawler, HttpFetcher, LinkExtractor};
use site_mirror::manifest::{RunStatus, SqliteManifest};
use site_mirror::output::print_report;
use site_mirror::store::{LocalStore, OverwritePolicy};
use site_mirror::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: mirror websites to a local directory tree
///
/// Each URL is crawled depth-first from its homepage. Every resource reachable
/// through same-host links (anchors, images, scripts, stylesheets) is stored
/// under `<root>/<host>/<url-path>`.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror websites to a local directory tree", long_about = None)]
struct Cli {
    /// Homepages to mirror, one independent crawl each
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Directory that receives one subdirectory per mirrored host
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// What to do when a resource maps onto an existing file
    #[arg(long, value_enum)]
    overwrite: Option<OverwritePolicy>,

    /// Maximum link distance from the homepage
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Wall-clock budget per site (e.g. 90, 30s, 5m, 1h)
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record runs and stored resources in this SQLite file
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Log and skip resources that fail to fetch instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Show statistics from the manifest and exit
    #[arg(long, conflicts_with = "urls")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn has_overrides(&self) -> bool {
        self.root.is_some()
            || self.overwrite.is_some()
            || self.max_depth.is_some()
            || self.timeout.is_some()
            || self.manifest.is_some()
            || self.keep_going
    }
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_mirror(&cli, &config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and validates
/// the result
fn load_settings(cli: &Cli) -> Result<(Config, String), ConfigError> {
    let (mut config, file_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(root) = &cli.root {
        config.output.root = root.clone();
    }
    if let Some(policy) = cli.overwrite {
        config.crawler.overwrite = policy;
    }
    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = Some(depth);
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout = Some(format!("{}ms", timeout.as_millis()));
    }
    if let Some(manifest) = &cli.manifest {
        config.output.manifest_path = Some(manifest.clone());
    }
    if cli.keep_going {
        config.crawler.keep_going = true;
    }

    validate(&config)?;

    let hash = match file_hash {
        Some(hash) if !cli.has_overrides() => hash,
        _ => compute_settings_hash(&config),
    };

    Ok((config, hash))
}

/// Handles the --stats mode: shows statistics from the manifest
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use site_mirror::output::{load_statistics, print_statistics};

    let path = config.output.manifest_path.as_deref().ok_or_else(|| {
        ConfigError::Validation("--stats needs --manifest or output.manifest-path".to_string())
    })?;

    println!("Manifest: {}\n", path.display());

    let manifest = SqliteManifest::open(path)?;
    let stats = load_statistics(&manifest)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main mirror operation, one crawl per homepage
async fn handle_mirror(
    cli: &Cli,
    config: &Config,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if cli.urls.is_empty() {
        tracing::info!("No URLs given, nothing to mirror");
        return Ok(());
    }

    // Reject every malformed homepage before anything is fetched
    let extractor = LinkExtractor::with_fallback_charset(&config.crawler.fallback_charset);
    let crawlers = cli
        .urls
        .iter()
        .map(|url| Crawler::new(url).map(|c| c.with_extractor(extractor.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut store = LocalStore::new(&config.output.root)?;
    let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.request_timeout())?;
    let mut manifest = config
        .output
        .manifest_path
        .as_deref()
        .map(SqliteManifest::open)
        .transpose()?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let options = CrawlOptions {
        max_depth: config.crawler.max_depth,
        deadline: config.crawler.deadline()?,
        keep_going: config.crawler.keep_going,
        cancel: cancel.clone(),
    };
    let policy = config.crawler.overwrite;

    tracing::info!(
        "Mirroring {} site(s) into {} (overwrite: {:?})",
        crawlers.len(),
        store.root().display(),
        policy
    );

    for mut crawler in crawlers {
        let run_id = match manifest.as_mut() {
            Some(m) => Some(m.begin_run(crawler.homepage().as_str(), config_hash)?),
            None => None,
        };

        let result = crawler.crawl(&fetcher, &mut store, policy, &options).await;

        if let (Some(m), Some(run_id)) = (manifest.as_mut(), run_id) {
            m.record_resources(run_id, crawler.stored_resources())?;
            let status = match &result {
                Ok(report) => RunStatus::from(report.completion),
                Err(_) => RunStatus::Failed,
            };
            m.finish_run(run_id, status)?;
        }

        match result {
            Ok(report) => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
            Err(e) => {
                tracing::error!("Mirror of {} failed: {}", crawler.homepage(), e);
                return Err(e.into());
            }
        }

        if cancel.is_cancelled() {
            tracing::warn!("Interrupted, remaining sites were not mirrored");
            break;
        }
    }

    Ok(())
}

/// Cancels `token` on the first Ctrl-C
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl-C, stopping after the current request");
            token.cancel();
        }
    });
}
