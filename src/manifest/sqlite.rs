//! SQLite manifest implementation

use crate::crawler::StoredResource;
use crate::manifest::schema::initialize_schema;
use crate::manifest::{ManifestError, ManifestResult, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, homepage, started_at, finished_at, config_hash, status";

/// SQLite-backed crawl manifest
pub struct SqliteManifest {
    conn: Connection,
}

impl SqliteManifest {
    /// Opens or creates a manifest at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteManifest)` - Successfully opened/created manifest
    /// * `Err(ManifestError)` - Failed to open the database
    pub fn open(path: &Path) -> ManifestResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory manifest (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> ManifestResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===== Run Management =====

    /// Records the start of a crawl and returns its run id
    pub fn begin_run(&mut self, homepage: &str, config_hash: &str) -> ManifestResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (homepage, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![homepage, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Stamps the finish time and final status of a run
    pub fn finish_run(&mut self, run_id: i64, status: RunStatus) -> ManifestResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(ManifestError::RunNotFound(run_id));
        }
        Ok(())
    }

    pub fn get_run(&self, run_id: i64) -> ManifestResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(ManifestError::RunNotFound(run_id))
    }

    /// All runs, oldest first
    pub fn list_runs(&self) -> ManifestResult<Vec<RunRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs ORDER BY id", RUN_COLUMNS))?;

        let runs = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Resources =====

    /// Records the resources stored by a run in a single transaction
    pub fn record_resources(
        &mut self,
        run_id: i64,
        resources: &[StoredResource],
    ) -> ManifestResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO resources (run_id, url, local_path, bytes, charset, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for resource in resources {
                stmt.execute(params![
                    run_id,
                    resource.url.as_str(),
                    resource.path.to_string_lossy().into_owned(),
                    resource.bytes as i64,
                    resource.charset,
                    resource.stored_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Recorded {} resources for run {}", resources.len(), run_id);
        Ok(())
    }

    pub fn count_resources(&self, run_id: i64) -> ManifestResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM resources WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn total_bytes(&self, run_id: i64) -> ManifestResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(bytes), 0) FROM resources WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }

    /// Local path recorded for `url` by its most recent run, if any
    pub fn latest_path_for(&self, url: &str) -> ManifestResult<Option<String>> {
        let path = self
            .conn
            .query_row(
                "SELECT local_path FROM resources WHERE url = ?1 ORDER BY id DESC LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(path)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        homepage: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
    })
}
