// Extraction pipeline — scan, classify, and catalog one or many apps.
//
// Each job is independent: it reads its own binary and resource directory
// and hands back a finished, immutable Corpus. Batches fan out over a
// bounded worker pool (blocking file I/O runs on tokio's blocking threads)
// and results are keyed by app name, so completion order never matters.
//
// A job that cannot read its binary still produces an outcome: an empty
// corpus plus the error, so one bad file never sinks the batch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus::Corpus;
use crate::db::Database;
use crate::lexical::scanner::{self, Scanner};
use crate::resources;

/// One application to extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub name: String,
    pub binary: PathBuf,
    #[serde(default)]
    pub identifier: Option<String>,
    /// Directory of bundled resource files to catalog.
    #[serde(default)]
    pub resources: Option<PathBuf>,
}

/// Result of one job. `error` is set when the binary could not be read.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub job: ExtractionJob,
    pub corpus: Corpus,
    pub error: Option<String>,
}

impl ExtractionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run a single extraction synchronously.
pub fn extract(job: &ExtractionJob, scanner: &Scanner) -> ExtractionOutcome {
    let data = match scanner::read_binary(&job.binary) {
        Ok(data) => data,
        Err(e) => {
            warn!(app = %job.name, error = %e, "Extraction failed, recording empty corpus");
            return ExtractionOutcome {
                job: job.clone(),
                corpus: Corpus::empty(&job.name, job.identifier.clone()),
                error: Some(format!("{e:#}")),
            };
        }
    };

    let scan = scanner.scan(&data);

    let resource_files = match &job.resources {
        Some(dir) => resources::catalog(dir).unwrap_or_else(|e| {
            warn!(app = %job.name, error = %e, "Resource catalog failed, continuing without resources");
            Vec::new()
        }),
        None => Vec::new(),
    };

    let corpus = Corpus::build(
        &job.name,
        job.identifier.clone(),
        data.len() as u64,
        scan,
        resource_files,
    );

    info!(
        app = %job.name,
        unique = corpus.unique_count(),
        occurrences = corpus.total_occurrences(),
        resources = corpus.resources().len(),
        "Extracted corpus"
    );

    ExtractionOutcome {
        job: job.clone(),
        corpus,
        error: None,
    }
}

/// Read a batch manifest: a JSON array of jobs.
///
/// Relative binary and resource paths are resolved against the manifest's
/// own directory.
pub fn load_manifest(path: &Path) -> Result<Vec<ExtractionJob>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest at {}", path.display()))?;
    let mut jobs: Vec<ExtractionJob> = serde_json::from_str(&raw)
        .with_context(|| format!("Manifest at {} is not a list of jobs", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for job in &mut jobs {
        if job.name.trim().is_empty() {
            anyhow::bail!("Manifest entry for {} has an empty name", job.binary.display());
        }
        if job.binary.is_relative() {
            job.binary = base.join(&job.binary);
        }
        if let Some(dir) = &job.resources {
            if dir.is_relative() {
                job.resources = Some(base.join(dir));
            }
        }
    }
    Ok(jobs)
}

/// Extract many apps in parallel. Results are keyed by app name.
pub async fn run_batch(
    jobs: Vec<ExtractionJob>,
    scanner: Scanner,
    concurrency: usize,
) -> BTreeMap<String, ExtractionOutcome> {
    let concurrency = concurrency.max(1);
    info!(jobs = jobs.len(), concurrency, "Starting batch extraction");

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Extracting [{bar:30}] {pos}/{len} ({eta})")
            .expect("progress template is valid"),
    );

    let outcomes: Vec<ExtractionOutcome> = stream::iter(jobs.into_iter().map(|job| {
        let pb = &pb;
        async move {
            let fallback = job.clone();
            let outcome = tokio::task::spawn_blocking(move || extract(&job, &scanner))
                .await
                .unwrap_or_else(|e| {
                    warn!(app = %fallback.name, error = %e, "Extraction worker panicked");
                    ExtractionOutcome {
                        corpus: Corpus::empty(&fallback.name, fallback.identifier.clone()),
                        error: Some(format!("worker failed: {e}")),
                        job: fallback,
                    }
                });
            pb.inc(1);
            outcome
        }
    }))
    .buffer_unordered(concurrency)
    .collect()
    .await;

    pb.finish_and_clear();

    let mut keyed = BTreeMap::new();
    for outcome in outcomes {
        let name = outcome.job.name.clone();
        if keyed.insert(name.clone(), outcome).is_some() {
            warn!(app = %name, "Duplicate app name in batch, keeping the last result");
        }
    }
    keyed
}

/// Persist every successful outcome. Returns how many were stored.
pub async fn store_outcomes(
    db: &Arc<dyn Database>,
    outcomes: &BTreeMap<String, ExtractionOutcome>,
) -> Result<usize> {
    let mut stored = 0;
    for outcome in outcomes.values().filter(|o| o.is_success()) {
        db.upsert_corpus(&outcome.corpus, &outcome.job.binary.to_string_lossy())
            .await?;
        stored += 1;
    }
    Ok(stored)
}
