// Database queries — CRUD operations for all tables.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::models::{StoredApp, StoredReport};
use crate::corpus::Corpus;
use crate::similarity::SimilarityReport;

// --- Applications ---

/// Save or replace one application's corpus.
pub fn upsert_corpus(conn: &Connection, corpus: &Corpus, binary_path: &str) -> Result<()> {
    let corpus_json = serde_json::to_string(corpus).context("Failed to serialize corpus")?;
    conn.execute(
        "INSERT INTO apps (name, identifier, binary_path, binary_size, unique_count,
                           total_occurrences, resource_count, corpus_json, analyzed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))
         ON CONFLICT(name) DO UPDATE SET
            identifier = ?2,
            binary_path = ?3,
            binary_size = ?4,
            unique_count = ?5,
            total_occurrences = ?6,
            resource_count = ?7,
            corpus_json = ?8,
            analyzed_at = datetime('now')",
        params![
            corpus.app(),
            corpus.identifier(),
            binary_path,
            corpus.binary_size() as i64,
            corpus.unique_count() as i64,
            corpus.total_occurrences() as i64,
            corpus.resources().len() as i64,
            corpus_json,
        ],
    )?;
    Ok(())
}

/// Load every stored corpus, optionally restricted to the named apps.
///
/// Rows whose JSON no longer matches the corpus shape are skipped with a
/// warning rather than failing the whole load.
pub fn load_corpora(conn: &Connection, names: Option<&[String]>) -> Result<Vec<Corpus>> {
    let mut stmt = conn.prepare("SELECT name, corpus_json FROM apps ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut corpora = Vec::new();
    for row in rows {
        let (name, json) = row?;
        if let Some(wanted) = names {
            if !wanted.iter().any(|w| w == &name) {
                continue;
            }
        }
        match serde_json::from_str::<Corpus>(&json) {
            Ok(corpus) => corpora.push(corpus),
            Err(e) => warn!(app = %name, error = %e, "Skipping malformed stored corpus"),
        }
    }
    Ok(corpora)
}

/// Load one stored corpus by app name.
pub fn get_corpus(conn: &Connection, name: &str) -> Result<Option<Corpus>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT corpus_json FROM apps WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    match json {
        Some(json) => {
            let corpus = serde_json::from_str(&json)
                .with_context(|| format!("Stored corpus for '{name}' is malformed"))?;
            Ok(Some(corpus))
        }
        None => Ok(None),
    }
}

/// List stored applications without decoding their corpora.
pub fn list_apps(conn: &Connection) -> Result<Vec<StoredApp>> {
    let mut stmt = conn.prepare(
        "SELECT name, identifier, binary_path, binary_size, unique_count,
                total_occurrences, resource_count, analyzed_at
         FROM apps ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredApp {
            name: row.get(0)?,
            identifier: row.get(1)?,
            binary_path: row.get(2)?,
            binary_size: row.get::<_, i64>(3)? as u64,
            unique_count: row.get::<_, i64>(4)? as u64,
            total_occurrences: row.get::<_, i64>(5)? as u64,
            resource_count: row.get::<_, i64>(6)? as u64,
            analyzed_at: row.get(7)?,
        })
    })?;

    let mut apps = Vec::new();
    for row in rows {
        apps.push(row?);
    }
    Ok(apps)
}

/// Remove a stored application. Returns true if a row was deleted.
pub fn delete_app(conn: &Connection, name: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM apps WHERE name = ?1", params![name])?;
    Ok(deleted > 0)
}

// --- Similarity report ---

/// Store the latest report in the singleton row (id = 1).
pub fn save_report(conn: &Connection, report: &SimilarityReport) -> Result<()> {
    let report_json = serde_json::to_string(report).context("Failed to serialize report")?;
    conn.execute(
        "INSERT INTO similarity_report (id, report_json, app_count, updated_at)
         VALUES (1, ?1, ?2, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            report_json = ?1,
            app_count = ?2,
            updated_at = datetime('now')",
        params![report_json, report.app_count() as i64],
    )?;
    Ok(())
}

/// Load the last report, if one exists and still decodes.
pub fn get_report(conn: &Connection) -> Result<Option<StoredReport>> {
    let row: Option<(String, u32, String)> = conn
        .query_row(
            "SELECT report_json, app_count, updated_at FROM similarity_report WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let Some((json, app_count, updated_at)) = row else {
        return Ok(None);
    };

    match serde_json::from_str::<SimilarityReport>(&json) {
        Ok(report) => Ok(Some(StoredReport {
            report,
            app_count,
            updated_at,
        })),
        Err(e) => {
            warn!(error = %e, "Stored similarity report is malformed, ignoring it");
            Ok(None)
        }
    }
}
