// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// Connection is Send but !Sync, so it sits behind a tokio::sync::Mutex to be
// shared across tasks.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{StoredApp, StoredReport};
use super::traits::Database;
use crate::corpus::Corpus;
use crate::similarity::SimilarityReport;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn upsert_corpus(&self, corpus: &Corpus, binary_path: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_corpus(&conn, corpus, binary_path)
    }

    async fn load_corpora(&self, names: Option<&[String]>) -> Result<Vec<Corpus>> {
        let conn = self.conn.lock().await;
        super::queries::load_corpora(&conn, names)
    }

    async fn get_corpus(&self, name: &str) -> Result<Option<Corpus>> {
        let conn = self.conn.lock().await;
        super::queries::get_corpus(&conn, name)
    }

    async fn list_apps(&self) -> Result<Vec<StoredApp>> {
        let conn = self.conn.lock().await;
        super::queries::list_apps(&conn)
    }

    async fn delete_app(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::delete_app(&conn, name)
    }

    async fn save_report(&self, report: &SimilarityReport) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::save_report(&conn, report)
    }

    async fn get_report(&self) -> Result<Option<StoredReport>> {
        let conn = self.conn.lock().await;
        super::queries::get_report(&conn)
    }
}
