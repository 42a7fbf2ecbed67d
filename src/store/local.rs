//! Filesystem store implementation
//!
//! This module provides a directory-tree implementation of the Store trait.

use crate::crawler::Resource;
use crate::store::traits::{Store, StoreError, StoreResult};
use crate::store::{OverwritePolicy, StoreOutcome};
use crate::ConfigError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// File name used for URL paths that end in a directory (`/`, `/docs/`)
pub const INDEX_FILE: &str = "index.html";

/// Longest file or directory name most filesystems accept (`NAME_MAX`)
pub const MAX_SEGMENT_BYTES: usize = 255;

/// Maps a URL path to its file under `root/host`
///
/// Every non-empty path segment becomes a path component, exactly as it appears
/// in the URL. A path ending in `/` maps to [`INDEX_FILE`] inside that directory.
///
/// # Examples
///
/// ```
/// use site_mirror::store::local_path;
/// use std::path::Path;
///
/// assert_eq!(
///     local_path(Path::new("/out"), "a.com", "/dir/page.html"),
///     Path::new("/out/a.com/dir/page.html")
/// );
/// assert_eq!(
///     local_path(Path::new("/out"), "a.com", "/"),
///     Path::new("/out/a.com/index.html")
/// );
/// ```
pub fn local_path(root: &Path, host: &str, url_path: &str) -> PathBuf {
    let mut path = root.join(host);

    for segment in url_path.split('/') {
        match segment {
            "" | "." | ".." => continue,
            _ => path.push(segment),
        }
    }

    if url_path.is_empty() || url_path.ends_with('/') {
        path.push(INDEX_FILE);
    }

    path
}

/// Directory-tree store rooted at a fixed directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    home: Option<String>,
}

impl LocalStore {
    /// Opens (creating if needed) a store rooted at `root`
    ///
    /// # Returns
    ///
    /// * `Ok(LocalStore)` - The root exists and is a directory
    /// * `Err(ConfigError::RootNotDirectory)` - `root` exists but is a file
    /// * `Err(ConfigError::Io)` - The root could not be created or resolved
    pub fn new(root: &Path) -> Result<Self, ConfigError> {
        if root.exists() && !root.is_dir() {
            return Err(ConfigError::RootNotDirectory(root.to_path_buf()));
        }

        fs::create_dir_all(root)?;
        let root = root.canonicalize()?;

        Ok(Self { root, home: None })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the first component between the host directory and `path` that
    /// has the wrong shape: a file where a directory is needed, or a directory
    /// where the file should go
    fn shape_clash(&self, home: &str, path: &Path) -> Option<PathBuf> {
        if path.is_dir() {
            return Some(path.to_path_buf());
        }

        let host_dir = self.root.join(home);
        path.ancestors()
            .skip(1)
            .take_while(|ancestor| ancestor.starts_with(&host_dir))
            .find(|ancestor| ancestor.is_file())
            .map(Path::to_path_buf)
    }

    fn collision(
        &self,
        resource: &Resource,
        path: PathBuf,
        policy: OverwritePolicy,
    ) -> StoreResult<StoreOutcome> {
        match policy {
            OverwritePolicy::Skip => {
                tracing::debug!("= {} already present at {}", resource.url(), path.display());
                Ok(StoreOutcome::AlreadyPresent(path))
            }
            OverwritePolicy::Fail => Err(StoreError::Conflict {
                uri: resource.url().to_string(),
                path,
            }),
        }
    }
}

impl Store for LocalStore {
    fn set_home(&mut self, host: &str) {
        self.home = Some(host.to_string());
    }

    fn home(&self) -> Option<&str> {
        self.home.as_deref()
    }

    fn path_for(&self, url: &Url) -> StoreResult<PathBuf> {
        let home = self.home.as_deref().ok_or(StoreError::MissingHome)?;
        Ok(local_path(&self.root, home, url.path()))
    }

    fn store(
        &self,
        resource: &mut Resource,
        policy: OverwritePolicy,
    ) -> StoreResult<StoreOutcome> {
        let home = self.home.as_deref().ok_or(StoreError::MissingHome)?;
        let path = local_path(&self.root, home, resource.url().path());
        resource.attach(path.clone());

        if let Some(segment) = resource
            .url()
            .path()
            .split('/')
            .find(|segment| segment.len() > MAX_SEGMENT_BYTES)
        {
            tracing::warn!(
                "{} cannot be stored: a {}-byte path segment exceeds the {}-byte name limit",
                resource.url(),
                segment.len(),
                MAX_SEGMENT_BYTES
            );
            return Ok(StoreOutcome::Unstorable(path));
        }

        if let Some(clash) = self.shape_clash(home, &path) {
            tracing::warn!(
                "{} cannot be stored at {}: {} is in the way",
                resource.url(),
                path.display(),
                clash.display()
            );
            return self.collision(resource, path, policy);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return self.collision(resource, path, policy);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        file.write_all(resource.body())
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!("+ {} => {}", resource.url(), path.display());
        Ok(StoreOutcome::Stored(path))
    }
}
