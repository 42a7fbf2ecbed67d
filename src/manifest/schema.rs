//! Database schema definitions for the crawl manifest

/// SQL schema for the manifest database
pub const SCHEMA_SQL: &str = r#"
-- One row per mirrored site per invocation
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    homepage TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Every resource written to disk during a run
CREATE TABLE IF NOT EXISTS resources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    local_path TEXT NOT NULL,
    bytes INTEGER NOT NULL,
    charset TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_resources_run ON resources(run_id);
CREATE INDEX IF NOT EXISTS idx_resources_url ON resources(url);
"#;

/// Initializes the manifest schema
///
/// Safe to call on an existing manifest.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
