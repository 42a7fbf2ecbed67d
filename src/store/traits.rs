//! Store traits and error types
//!
//! This module defines the trait interface for resource stores and
//! associated error types.

use crate::crawler::Resource;
use crate::store::{OverwritePolicy, StoreOutcome};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur while storing a resource
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{uri} maps to {}, which already exists", path.display())]
    Conflict { uri: String, path: PathBuf },

    #[error("No homepage host set on the store")]
    MissingHome,

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for resource store implementations
pub trait Store {
    /// Fixes the host directory used for every following store call
    fn set_home(&mut self, host: &str);

    /// The host directory currently in use
    fn home(&self) -> Option<&str>;

    /// Computes where a URL would be stored, without touching the filesystem
    fn path_for(&self, url: &Url) -> StoreResult<PathBuf>;

    /// Persists a fetched resource
    ///
    /// # Returns
    ///
    /// * `Ok(StoreOutcome::Stored(path))` - The body was written to a new file
    /// * `Ok(StoreOutcome::AlreadyPresent(path))` - The path was taken and `policy` is `Skip`
    /// * `Ok(StoreOutcome::Unstorable(path))` - A path segment is too long for a file name
    /// * `Err(StoreError::Conflict)` - The path was taken and `policy` is `Fail`
    /// * `Err(StoreError::MissingHome)` - `set_home` was never called
    fn store(&self, resource: &mut Resource, policy: OverwritePolicy)
        -> StoreResult<StoreOutcome>;
}
