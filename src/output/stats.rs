//! Statistics generation from the crawl manifest
//!
//! This module provides functionality for extracting and displaying
//! per-run statistics from the manifest.

use crate::manifest::{ManifestError, RunStatus, SqliteManifest};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Totals for a single recorded run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub id: i64,
    pub homepage: String,
    pub status: RunStatus,
    pub started_at: String,
    pub duration_seconds: Option<u64>,
    pub resources: u64,
    pub bytes: u64,
}

/// Manifest statistics summary
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// One entry per run, oldest first
    pub runs: Vec<RunSummary>,

    /// Count of runs by final status
    pub runs_by_status: HashMap<RunStatus, u64>,

    /// Resources stored across every run
    pub total_resources: u64,

    /// Bytes written across every run
    pub total_bytes: u64,
}

/// Loads statistics from the manifest
///
/// # Arguments
///
/// * `manifest` - The manifest to query
///
/// # Returns
///
/// * `Ok(RunStatistics)` - Successfully loaded statistics
/// * `Err(ManifestError)` - Failed to query the manifest
pub fn load_statistics(manifest: &SqliteManifest) -> Result<RunStatistics, ManifestError> {
    let mut stats = RunStatistics::default();

    for run in manifest.list_runs()? {
        let resources = manifest.count_resources(run.id)?;
        let bytes = manifest.total_bytes(run.id)?;

        stats.total_resources += resources;
        stats.total_bytes += bytes;
        *stats.runs_by_status.entry(run.status).or_insert(0) += 1;

        stats.runs.push(RunSummary {
            id: run.id,
            duration_seconds: duration_seconds(&run.started_at, run.finished_at.as_deref()),
            homepage: run.homepage,
            status: run.status,
            started_at: run.started_at,
            resources,
            bytes,
        });
    }

    Ok(stats)
}

fn duration_seconds(started: &str, finished: Option<&str>) -> Option<u64> {
    let started = started.parse::<DateTime<Utc>>().ok()?;
    let finished = finished?.parse::<DateTime<Utc>>().ok()?;
    u64::try_from((finished - started).num_seconds()).ok()
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Overview:");
    println!("  Runs recorded: {}", stats.runs.len());
    println!("  Resources stored: {}", stats.total_resources);
    println!("  Bytes written: {}", stats.total_bytes);
    println!();

    if !stats.runs_by_status.is_empty() {
        println!("Runs by Status:");
        let mut status_counts: Vec<_> = stats.runs_by_status.iter().collect();
        status_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (status, count) in status_counts {
            println!("  {}: {}", status.to_db_string(), count);
        }
        println!();
    }

    if !stats.runs.is_empty() {
        println!("Runs:");
        for run in &stats.runs {
            let duration = run
                .duration_seconds
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  #{} {} [{}] started {} ({}): {} resources, {} bytes",
                run.id,
                run.homepage,
                run.status.to_db_string(),
                run.started_at,
                duration,
                run.resources,
                run.bytes
            );
        }
    }
}
