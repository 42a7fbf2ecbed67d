use crate::config::parser::parse_duration;
use crate::store::OverwritePolicy;
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site-Mirror
///
/// Every section and key is optional; a missing config file behaves like an
/// empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link distance from the homepage (unbounded if absent)
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Wall-clock budget per site, e.g. "90", "30s", "5m", "1h"
    pub timeout: Option<String>,

    /// Upper bound for a single HTTP request (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// What to do when a resource's path already exists
    pub overwrite: OverwritePolicy,

    /// Log and skip fetch failures instead of aborting the crawl
    #[serde(rename = "keep-going")]
    pub keep_going: bool,

    /// Charset for pages whose declared charset is not recognized
    #[serde(rename = "fallback-charset")]
    pub fallback_charset: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            timeout: None,
            request_timeout: 30,
            overwrite: OverwritePolicy::Skip,
            keep_going: false,
            fallback_charset: "utf-8".to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Parses the per-site deadline, if one is configured
    pub fn deadline(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout.as_deref().map(parse_duration).transpose()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "site-mirror".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version, or CrawlerName/Version (+ContactURL)
    pub fn user_agent_string(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives one subdirectory per mirrored host
    pub root: PathBuf,

    /// Optional SQLite manifest recording runs and stored resources
    #[serde(rename = "manifest-path")]
    pub manifest_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifest_path: None,
        }
    }
}
