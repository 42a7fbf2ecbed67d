//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Seeding and draining the frontier
//! - Visited-set deduplication
//! - Fetching, storing and link extraction
//! - Depth bounds, deadlines and cancellation

use crate::crawler::extractor::LinkExtractor;
use crate::crawler::fetcher::Fetch;
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::resource::StoredResource;
use crate::output::{CrawlCompletion, CrawlReport};
use crate::store::{OverwritePolicy, Store, StoreOutcome};
use crate::url::{host_segment, normalize_url};
use crate::MirrorError;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Knobs that bound a single crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Maximum link distance from the homepage; pages beyond it are not queued
    pub max_depth: Option<u32>,

    /// Wall-clock budget for the whole crawl
    pub deadline: Option<Duration>,

    /// Log and skip fetch failures instead of aborting the crawl
    pub keep_going: bool,

    /// Cancels the crawl between iterations and during a fetch
    pub cancel: CancellationToken,
}

/// Main crawler structure
///
/// One `Crawler` mirrors one site. It exclusively owns the frontier and the
/// visited set for the duration of [`Crawler::crawl`].
pub struct Crawler {
    homepage: Url,
    frontier: Frontier<FrontierEntry>,
    visited: HashMap<Url, Vec<Url>>,
    stored: Vec<StoredResource>,
    extractor: LinkExtractor,
}

impl Crawler {
    /// Creates a crawler for the site rooted at `homepage`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - The homepage is an absolute URL with a host
    /// * `Err(MirrorError::Config)` - The homepage is malformed or host-less
    pub fn new(homepage: &str) -> Result<Self, MirrorError> {
        let homepage = normalize_url(homepage).map_err(|e| {
            crate::ConfigError::InvalidUrl(format!("Invalid homepage '{}': {}", homepage, e))
        })?;

        Ok(Self {
            homepage,
            frontier: Frontier::new(),
            visited: HashMap::new(),
            stored: Vec::new(),
            extractor: LinkExtractor::new(),
        })
    }

    /// Replaces the link extractor (e.g. to change the fallback charset)
    pub fn with_extractor(mut self, extractor: LinkExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn homepage(&self) -> &Url {
        &self.homepage
    }

    /// Every URL visited so far, with the links discovered on it
    pub fn visited(&self) -> &HashMap<Url, Vec<Url>> {
        &self.visited
    }

    /// Resources written to disk so far, in store order
    pub fn stored_resources(&self) -> &[StoredResource] {
        &self.stored
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawl loop that:
    /// 1. Seeds the frontier with the homepage
    /// 2. Pops the most recently discovered URL, skipping visited ones
    /// 3. Fetches it and asks the store to persist it
    /// 4. Extracts in-scope links and pushes them onto the frontier
    ///
    /// A resource whose path already exists is abandoned without following its
    /// links when `policy` is `Skip`, and aborts the crawl with
    /// `MirrorError::StorageConflict` when `policy` is `Fail`.
    ///
    /// Fetch failures abort the crawl unless `options.keep_going` is set.
    /// Cancellation and the deadline end the crawl early with an `Ok` report.
    pub async fn crawl<F, S>(
        &mut self,
        fetcher: &F,
        store: &mut S,
        policy: OverwritePolicy,
        options: &CrawlOptions,
    ) -> Result<CrawlReport, MirrorError>
    where
        F: Fetch,
        S: Store,
    {
        let started = Instant::now();
        let deadline = options.deadline.map(|budget| started + budget);
        let mut report = CrawlReport::new(self.homepage.clone());

        store.set_home(&host_segment(&self.homepage)?);
        self.frontier.push(FrontierEntry::new(self.homepage.clone(), 0));

        tracing::info!("Mirroring {}", self.homepage);

        let completion = loop {
            if options.cancel.is_cancelled() {
                break CrawlCompletion::Cancelled;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break CrawlCompletion::DeadlineReached;
            }

            let Some(entry) = self.frontier.pop() else {
                break CrawlCompletion::Finished;
            };

            if self.visited.contains_key(&entry.url) {
                tracing::trace!("Already visited {}", entry.url);
                continue;
            }
            self.visited.insert(entry.url.clone(), Vec::new());

            let fetched = tokio::select! {
                biased;
                _ = options.cancel.cancelled() => break CrawlCompletion::Cancelled,
                _ = wait_for_deadline(deadline) => break CrawlCompletion::DeadlineReached,
                result = fetcher.fetch(&entry.url) => result,
            };

            let mut resource = match fetched {
                Ok(resource) => resource,
                Err(e) if options.keep_going => {
                    tracing::warn!("Skipping {}: {}", entry.url, e);
                    report.fetch_failures += 1;
                    continue;
                }
                Err(e) => {
                    tracing::error!("Fetch failed for {}: {}", entry.url, e);
                    return Err(e.into());
                }
            };

            match store.store(&mut resource, policy)? {
                StoreOutcome::Stored(path) => {
                    report.stored += 1;
                    self.stored.push(StoredResource::new(&resource, path));
                }
                StoreOutcome::AlreadyPresent(path) => {
                    tracing::info!(
                        "= {} already present at {}, not following its links",
                        entry.url,
                        path.display()
                    );
                    report.skipped += 1;
                    continue;
                }
                StoreOutcome::Unstorable(_) => {
                    report.skipped += 1;
                    continue;
                }
            }

            let links = self.extractor.extract_links(&resource);
            report.links_discarded += links.discarded() as u64;
            let children: Vec<Url> = links.collect();
            report.links_kept += children.len() as u64;

            let child_depth = entry.depth + 1;
            if options.max_depth.is_some_and(|max| child_depth > max) {
                tracing::debug!(
                    "Depth limit reached at {}, not queueing {} links",
                    entry.url,
                    children.len()
                );
            } else {
                self.frontier.push_all(
                    children
                        .iter()
                        .cloned()
                        .map(|url| FrontierEntry::new(url, child_depth)),
                );
            }

            self.visited.insert(entry.url, children);
        };

        report.elapsed = started.elapsed();
        report.completion = completion;

        match completion {
            CrawlCompletion::Finished => tracing::info!(
                "Finished {}: {} stored, {} skipped in {:?}",
                self.homepage,
                report.stored,
                report.skipped,
                report.elapsed
            ),
            CrawlCompletion::Cancelled => tracing::warn!(
                "Crawl of {} cancelled with {} URLs still queued",
                self.homepage,
                self.frontier.len()
            ),
            CrawlCompletion::DeadlineReached => tracing::warn!(
                "Crawl of {} hit its deadline with {} URLs still queued",
                self.homepage,
                self.frontier.len()
            ),
        }

        Ok(report)
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
