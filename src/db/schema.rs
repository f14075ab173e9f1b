// Database schema — application corpora and the last similarity report.
//
// `schema_version` records the schema revision the tables were created at.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// Idempotent; runs on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per analyzed application. The full corpus is stored as
        -- JSON so it can be reloaded for comparison without rescanning.
        CREATE TABLE IF NOT EXISTS apps (
            name TEXT PRIMARY KEY,
            identifier TEXT,                   -- dotted bundle identifier, if known
            binary_path TEXT NOT NULL,
            binary_size INTEGER NOT NULL DEFAULT 0,
            unique_count INTEGER NOT NULL DEFAULT 0,
            total_occurrences INTEGER NOT NULL DEFAULT 0,
            resource_count INTEGER NOT NULL DEFAULT 0,  -- for `status` without decoding the corpus
            corpus_json TEXT NOT NULL,
            analyzed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The most recent similarity report
        CREATE TABLE IF NOT EXISTS similarity_report (
            id INTEGER PRIMARY KEY CHECK (id = 1),  -- singleton row
            report_json TEXT NOT NULL,
            app_count INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, apps, similarity_report
        assert_eq!(table_count(&conn).unwrap(), 3);
    }

    #[test]
    fn test_schema_version_recorded_once() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![1]);
    }

    #[test]
    fn test_resource_count_column_exists() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO apps (name, binary_path, corpus_json, resource_count)
             VALUES ('demo', '/apps/demo', '{}', 12)",
            [],
        )
        .unwrap();

        let count: i64 = conn
            .query_row("SELECT resource_count FROM apps WHERE name = 'demo'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 12);
    }
}
