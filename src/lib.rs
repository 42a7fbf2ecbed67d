//! Site-Mirror: a same-host website mirroring crawler
//!
//! This crate walks a website depth-first from its homepage, stores every fetched
//! resource under `<root>/<host>/<url-path>`, and follows every in-scope link
//! (anchors, images, scripts, stylesheets) until nothing new remains to visit.

pub mod config;
pub mod crawler;
pub mod manifest;
pub mod output;
pub mod store;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Site-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage conflict: {uri} maps to existing file {}", path.display())]
    StorageConflict { uri: String, path: PathBuf },

    #[error("Storage error: {0}")]
    Store(store::StoreError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] manifest::ManifestError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<store::StoreError> for MirrorError {
    fn from(err: store::StoreError) -> Self {
        match err {
            store::StoreError::Conflict { uri, path } => Self::StorageConflict { uri, path },
            store::StoreError::MissingHome => Self::Config(ConfigError::MissingHomepage),
            other => Self::Store(other),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid duration '{0}' (expected e.g. 90, 30s, 5m, 1h, 250ms)")]
    InvalidDuration(String),

    #[error("Storage root {} exists but is not a directory", .0.display())]
    RootNotDirectory(PathBuf),

    #[error("No homepage host designated before storing")]
    MissingHomepage,
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOptions, Crawler, Fetch, HttpFetcher, LinkExtractor, Resource};
pub use output::{CrawlCompletion, CrawlReport};
pub use store::{LocalStore, OverwritePolicy, Store, StoreOutcome};
