// Comparison pipeline — load stored corpora, build the similarity report,
// and persist it.
//
// Strictly sequential: the report is only built once every corpus it
// covers has been loaded in full.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::db::Database;
use crate::similarity::{build_report, ComparisonOptions, SimilarityReport};

/// Build and store a report over the stored corpora.
///
/// Fewer than two usable corpora surfaces as `SimilarityError` inside the
/// returned error, so callers can `downcast_ref` and decide how to react.
pub async fn run(db: &Arc<dyn Database>, options: &ComparisonOptions) -> Result<SimilarityReport> {
    let corpora = db.load_corpora(options.apps.as_deref()).await?;
    info!(loaded = corpora.len(), "Loaded stored corpora");

    let report = build_report(&corpora, options)?;
    db.save_report(&report).await?;

    Ok(report)
}
