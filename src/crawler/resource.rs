//! Fetched resources and the record kept once they are stored

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use url::Url;

/// Charset assumed when a response does not declare one
pub const DEFAULT_CHARSET: &str = "utf-8";

/// One fetched byte stream together with its source URL
///
/// A `Resource` can only be built from a completed fetch, so body and charset
/// are always present together. The local path stays empty until a store
/// assigns one.
#[derive(Debug, Clone)]
pub struct Resource {
    url: Url,
    body: Vec<u8>,
    charset: String,
    local_path: Option<PathBuf>,
}

impl Resource {
    /// Creates a resource from a successful fetch
    ///
    /// An empty charset is replaced by [`DEFAULT_CHARSET`].
    pub fn fetched(url: Url, body: Vec<u8>, charset: impl Into<String>) -> Self {
        let charset = charset.into();
        let charset = if charset.trim().is_empty() {
            DEFAULT_CHARSET.to_string()
        } else {
            charset.trim().to_lowercase()
        };

        Self {
            url,
            body,
            charset,
            local_path: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    /// The path assigned by the store, if any
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Records the local path chosen by a store
    pub fn attach(&mut self, path: PathBuf) {
        self.local_path = Some(path);
    }
}

/// A resource that was written to disk during a crawl
#[derive(Debug, Clone)]
pub struct StoredResource {
    pub url: Url,
    pub path: PathBuf,
    pub bytes: u64,
    pub charset: String,
    pub stored_at: DateTime<Utc>,
}

impl StoredResource {
    pub fn new(resource: &Resource, path: PathBuf) -> Self {
        Self {
            url: resource.url().clone(),
            path,
            bytes: resource.body().len() as u64,
            charset: resource.charset().to_string(),
            stored_at: Utc::now(),
        }
    }
}
