// Database trait — async interface for all storage operations.
//
// Implementor: SqliteDatabase (wraps rusqlite). Methods are async so a
// blocking backend behind a Mutex and a native async one would fit the same
// interface; callers hold an `Arc<dyn Database>`.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{StoredApp, StoredReport};
use crate::corpus::Corpus;
use crate::similarity::SimilarityReport;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Applications ---

    /// Save or replace an application's corpus.
    async fn upsert_corpus(&self, corpus: &Corpus, binary_path: &str) -> Result<()>;

    /// Load stored corpora, optionally only the named apps. Malformed rows
    /// are skipped with a warning.
    async fn load_corpora(&self, names: Option<&[String]>) -> Result<Vec<Corpus>>;

    /// Load one stored corpus by app name.
    async fn get_corpus(&self, name: &str) -> Result<Option<Corpus>>;

    /// List stored applications, ordered by name.
    async fn list_apps(&self) -> Result<Vec<StoredApp>>;

    /// Remove a stored application. Returns true if it existed.
    async fn delete_app(&self, name: &str) -> Result<bool>;

    // --- Similarity report ---

    /// Store the latest similarity report (singleton row).
    async fn save_report(&self, report: &SimilarityReport) -> Result<()>;

    /// Load the last stored report, if any.
    async fn get_report(&self) -> Result<Option<StoredReport>>;
}
