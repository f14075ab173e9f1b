// Data models — rows as they come back out of the store.
//
// Kept separate from the queries so display code can use them without
// depending on rusqlite.

use serde::{Deserialize, Serialize};

use crate::similarity::SimilarityReport;

/// Listing row for one stored application (no corpus payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredApp {
    pub name: String,
    pub identifier: Option<String>,
    pub binary_path: String,
    pub binary_size: u64,
    pub unique_count: u64,
    pub total_occurrences: u64,
    pub resource_count: u64,
    pub analyzed_at: String,
}

/// The last persisted similarity report.
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub report: SimilarityReport,
    pub app_count: u32,
    pub updated_at: String,
}
