// Database layer — SQLite storage for extracted corpora and the last
// similarity report.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever SIFT_DB_PATH points
// (defaults to ./sift.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use traits::Database;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Open (or create) the database and ensure its tables exist.
///
/// Called by `sift init` and by any command that writes results.
pub fn initialize(db_path: &str) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {db_path}. Run `sift init` first.");
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Tables are created lazily, so an empty file still works
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing SQLite database behind the `Database` trait.
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = open(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Create (if needed) and open a SQLite database behind the `Database` trait.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// An in-memory database with the schema applied, for tests and dry runs.
pub fn in_memory() -> Result<Arc<dyn Database>> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}
