//! Crawler module for mirroring a site
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - HTML parsing and link extraction
//! - The LIFO frontier
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod resource;

pub use coordinator::{CrawlOptions, Crawler};
pub use extractor::{LinkExtractor, Links};
pub use fetcher::{build_http_client, charset_from_content_type, Fetch, FetchError, HttpFetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use resource::{Resource, StoredResource, DEFAULT_CHARSET};

use crate::output::CrawlReport;
use crate::store::{OverwritePolicy, Store};
use crate::MirrorError;

/// Mirrors one site into `store`
///
/// This is the main entry point for a single crawl. It will:
/// 1. Validate and normalize the homepage URL
/// 2. Fix the store's host directory to the homepage host
/// 3. Walk the site depth-first, storing every in-scope resource
///
/// # Arguments
///
/// * `homepage` - The URL the crawl starts from
/// * `fetcher` - The transport used for every request
/// * `store` - Where fetched resources are written
/// * `policy` - What to do when a target path already exists
/// * `options` - Depth, deadline and cancellation bounds
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::UserAgentConfig;
/// use site_mirror::crawler::{mirror_site, CrawlOptions, HttpFetcher};
/// use site_mirror::store::{LocalStore, OverwritePolicy};
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&UserAgentConfig::default(), Duration::from_secs(30))?;
/// let mut store = LocalStore::new(Path::new("mirror"))?;
/// let report = mirror_site(
///     "http://example.com/",
///     &fetcher,
///     &mut store,
///     OverwritePolicy::Skip,
///     &CrawlOptions::default(),
/// )
/// .await?;
/// println!("{} resources stored", report.stored);
/// # Ok(())
/// # }
/// ```
pub async fn mirror_site<F, S>(
    homepage: &str,
    fetcher: &F,
    store: &mut S,
    policy: OverwritePolicy,
    options: &CrawlOptions,
) -> Result<CrawlReport, MirrorError>
where
    F: Fetch,
    S: Store,
{
    Crawler::new(homepage)?
        .crawl(fetcher, store, policy, options)
        .await
}
