//! Manifest module for recording crawl runs
//!
//! The manifest is an optional SQLite file that keeps a history of:
//! - Each crawl run (homepage, timing, settings hash, final status)
//! - Every resource written to disk during a run
//!
//! It is a record only. The crawler never reads it back to decide what to fetch.

mod schema;
mod sqlite;

pub use sqlite::SqliteManifest;

use crate::output::CrawlCompletion;
use thiserror::Error;

/// Errors that can occur while reading or writing the manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub homepage: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl From<CrawlCompletion> for RunStatus {
    fn from(completion: CrawlCompletion) -> Self {
        match completion {
            CrawlCompletion::Finished => Self::Completed,
            CrawlCompletion::Cancelled | CrawlCompletion::DeadlineReached => Self::Cancelled,
        }
    }
}
