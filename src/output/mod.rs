//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - The per-site `CrawlReport` returned by every crawl
//! - Printing reports at the end of a run
//! - Loading and printing statistics from the manifest

pub mod stats;

pub use stats::{load_statistics, print_statistics, RunStatistics};

use std::time::Duration;
use url::Url;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlCompletion {
    /// The frontier was drained
    Finished,
    /// The cancellation token fired
    Cancelled,
    /// The configured deadline passed before the frontier was drained
    DeadlineReached,
}

impl CrawlCompletion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
            Self::DeadlineReached => "deadline reached",
        }
    }
}

/// Counters collected while mirroring one site
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub homepage: Url,

    /// Resources written to new files
    pub stored: u64,

    /// Resources not written: path already present (permissive mode) or unstorable name
    pub skipped: u64,

    /// Fetches that failed and were skipped (keep-going mode)
    pub fetch_failures: u64,

    /// In-scope links pushed to or already handled by the frontier
    pub links_kept: u64,

    /// Candidates dropped as off-host, opaque or malformed
    pub links_discarded: u64,

    pub elapsed: Duration,
    pub completion: CrawlCompletion,
}

impl CrawlReport {
    pub fn new(homepage: Url) -> Self {
        Self {
            homepage,
            stored: 0,
            skipped: 0,
            fetch_failures: 0,
            links_kept: 0,
            links_discarded: 0,
            elapsed: Duration::ZERO,
            completion: CrawlCompletion::Finished,
        }
    }
}

/// Prints a crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== {} ===", report.homepage);
    println!(
        "  Status: {} after {:.1}s",
        report.completion.as_str(),
        report.elapsed.as_secs_f64()
    );
    println!("  Stored: {}", report.stored);
    println!("  Skipped: {}", report.skipped);
    if report.fetch_failures > 0 {
        println!("  Fetch failures: {}", report.fetch_failures);
    }
    println!(
        "  Links: {} followed, {} discarded",
        report.links_kept, report.links_discarded
    );
    println!();
}
