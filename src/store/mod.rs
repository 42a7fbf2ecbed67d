//! Store module for persisting fetched resources
//!
//! This module maps each fetched resource to a local file and writes it:
//! - Deterministic `root/host/url-path` path mapping
//! - On-demand directory creation
//! - Atomic existence check and write
//! - Skip-or-fail policy for paths that already exist

mod local;
mod traits;

pub use local::{local_path, LocalStore, INDEX_FILE};
pub use traits::{Store, StoreError, StoreResult};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What to do when a resource maps onto a path that already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Permissive: leave the existing file alone and skip the resource
    #[default]
    Skip,
    /// Strict: treat the collision as a fatal storage conflict
    Fail,
}

/// Result of a successful store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The body was written to a new file
    Stored(PathBuf),
    /// The target path already existed and nothing was written
    AlreadyPresent(PathBuf),
    /// The target path cannot exist on this filesystem and nothing was written
    Unstorable(PathBuf),
}

impl StoreOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Stored(path) | Self::AlreadyPresent(path) | Self::Unstorable(path) => path,
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        overwrite: OverwritePolicy,
    }

    #[test]
    fn test_policy_from_toml() {
        let skip: Wrapper = toml::from_str(r#"overwrite = "skip""#).unwrap();
        assert_eq!(skip.overwrite, OverwritePolicy::Skip);

        let fail: Wrapper = toml::from_str(r#"overwrite = "fail""#).unwrap();
        assert_eq!(fail.overwrite, OverwritePolicy::Fail);
    }

    #[test]
    fn test_default_policy_is_skip() {
        assert_eq!(OverwritePolicy::default(), OverwritePolicy::Skip);
    }

    #[test]
    fn test_outcome_path() {
        let stored = StoreOutcome::Stored(PathBuf::from("/out/a.com/p"));
        assert!(stored.is_stored());
        assert_eq!(stored.path(), Path::new("/out/a.com/p"));

        let present = StoreOutcome::AlreadyPresent(PathBuf::from("/out/a.com/p"));
        assert!(!present.is_stored());
    }
}
