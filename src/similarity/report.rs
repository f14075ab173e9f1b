// Similarity report — the read-only aggregate over N >= 2 corpora.
//
// Built in one sequential pass once every corpus is complete. Nothing here
// is incremental: adding an application means building a new report.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::overlap::{jaccard, prefix_similarity};
use super::score::{PairScores, SimilarityWeights};
use crate::corpus::duplicates::{
    self, DuplicateAnalysis, DuplicateEntry, ResourceDuplicateAnalysis, DEFAULT_TOP_N,
};
use crate::corpus::Corpus;
use crate::lexical::category::Category;
use crate::lexical::noise::{FilterStatistics, NoiseFilter};
use crate::resources;

/// Corpora needed before a comparison makes sense.
pub const MIN_CORPORA: usize = 2;

/// How many filter-discarded fragments to keep as a sanity sample.
pub const DISCARDED_SAMPLE_SIZE: usize = 10;

const HIGH_DUPLICATION_RATE: f64 = 50.0;
const MODERATE_DUPLICATION_RATE: f64 = 30.0;
const SAVINGS_RECOMMENDATION_BYTES: u64 = 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("Insufficient input: need at least {required} corpora, have {available}")]
    InsufficientInput { available: usize, required: usize },
}

/// Knobs for one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonOptions {
    pub filter: NoiseFilter,
    /// Fragments in these categories are left out of comparison sets.
    pub excluded_categories: Vec<Category>,
    /// Restrict the comparison to these apps. `None` compares everything.
    pub apps: Option<Vec<String>>,
    pub top_n: usize,
    pub weights: SimilarityWeights,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            filter: NoiseFilter::default(),
            excluded_categories: Vec::new(),
            apps: None,
            top_n: DEFAULT_TOP_N,
            weights: SimilarityWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub apps: Vec<String>,
    pub filter_enabled: bool,
    pub excluded_categories: Vec<Category>,
    #[serde(default)]
    pub filter_statistics: FilterStatistics,
}

/// One ranked row of the pair list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSimilarity {
    pub app_a: String,
    pub app_b: String,
    pub scores: PairScores,
}

/// Per-app totals shown beside the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSummary {
    pub app: String,
    pub identifier: Option<String>,
    pub unique_fragments: usize,
    pub compared_fragments: usize,
    pub total_occurrences: u64,
    pub resource_count: usize,
    pub resource_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub metadata: ReportMetadata,
    /// Symmetric: matrix[a][b] == matrix[b][a], diagonal included.
    pub matrix: BTreeMap<String, BTreeMap<String, PairScores>>,
    /// Off-diagonal pairs, highest composite first.
    pub pairs: Vec<PairSimilarity>,
    pub high_similarity: Vec<PairSimilarity>,
    pub duplicates: DuplicateAnalysis,
    pub top_duplicates: Vec<DuplicateEntry>,
    pub resource_duplicates: ResourceDuplicateAnalysis,
    pub category_histograms: BTreeMap<String, BTreeMap<Category, usize>>,
    /// App to resource category to file count.
    #[serde(default)]
    pub resource_types: BTreeMap<String, BTreeMap<String, usize>>,
    pub app_summaries: Vec<AppSummary>,
    pub discarded_samples: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SimilarityReport {
    pub fn app_count(&self) -> usize {
        self.metadata.apps.len()
    }

    pub fn scores(&self, a: &str, b: &str) -> Option<&PairScores> {
        self.matrix.get(a).and_then(|row| row.get(b))
    }
}

/// Pick the corpora a comparison should run over.
///
/// Names in the subset that match no loaded corpus are logged and ignored.
fn select<'a>(corpora: &'a [Corpus], subset: Option<&[String]>) -> Vec<&'a Corpus> {
    let Some(wanted) = subset else {
        return corpora.iter().collect();
    };

    for name in wanted {
        if !corpora.iter().any(|c| c.app() == name) {
            warn!(app = %name, "Requested app has no stored corpus, skipping");
        }
    }
    corpora
        .iter()
        .filter(|c| wanted.iter().any(|w| w == c.app()))
        .collect()
}

/// Build the full similarity report over the given corpora.
pub fn build_report(
    corpora: &[Corpus],
    options: &ComparisonOptions,
) -> Result<SimilarityReport, SimilarityError> {
    let mut selected = select(corpora, options.apps.as_deref());
    selected.sort_by(|a, b| a.app().cmp(b.app()));
    selected.dedup_by(|a, b| a.app() == b.app());

    if selected.len() < MIN_CORPORA {
        return Err(SimilarityError::InsufficientInput {
            available: selected.len(),
            required: MIN_CORPORA,
        });
    }

    info!(
        apps = selected.len(),
        filter = options.filter.is_enabled(),
        "Building similarity report"
    );

    let sets: BTreeMap<String, BTreeSet<String>> = selected
        .iter()
        .map(|c| {
            (
                c.app().to_string(),
                c.comparison_set(&options.filter, &options.excluded_categories),
            )
        })
        .collect();
    let resource_sets: BTreeMap<&str, BTreeSet<String>> = selected
        .iter()
        .map(|c| (c.app(), c.resource_names()))
        .collect();

    // Matrix, upper triangle mirrored into the lower
    let mut matrix: BTreeMap<String, BTreeMap<String, PairScores>> = BTreeMap::new();
    let mut pairs = Vec::new();
    for (i, a) in selected.iter().enumerate() {
        for b in &selected[i..] {
            let scores = PairScores::from_fractions(
                jaccard(&sets[a.app()], &sets[b.app()]),
                jaccard(&resource_sets[a.app()], &resource_sets[b.app()]),
                prefix_similarity(a.identifier(), b.identifier()),
                &options.weights,
            );
            matrix
                .entry(a.app().to_string())
                .or_default()
                .insert(b.app().to_string(), scores);
            matrix
                .entry(b.app().to_string())
                .or_default()
                .insert(a.app().to_string(), scores);

            if a.app() != b.app() {
                pairs.push(PairSimilarity {
                    app_a: a.app().to_string(),
                    app_b: b.app().to_string(),
                    scores,
                });
            }
        }
    }
    pairs.sort_by(|x, y| {
        y.scores
            .composite
            .total_cmp(&x.scores.composite)
            .then_with(|| x.app_a.cmp(&y.app_a))
            .then_with(|| x.app_b.cmp(&y.app_b))
    });
    let high_similarity: Vec<PairSimilarity> = pairs
        .iter()
        .filter(|p| p.scores.is_high_similarity())
        .cloned()
        .collect();

    let fragment_dups = duplicates::aggregate(&sets);
    let top_duplicates = fragment_dups.top(options.top_n);
    let resource_duplicates =
        duplicates::aggregate_resources(selected.iter().map(|c| (c.app(), c.resources())));

    let category_histograms = selected
        .iter()
        .map(|c| (c.app().to_string(), c.histogram()))
        .collect();

    let resource_types = selected
        .iter()
        .map(|c| (c.app().to_string(), resources::type_distribution(c.resources())))
        .collect();

    let app_summaries = selected
        .iter()
        .map(|c| AppSummary {
            app: c.app().to_string(),
            identifier: c.identifier().map(str::to_string),
            unique_fragments: c.unique_count(),
            compared_fragments: sets[c.app()].len(),
            total_occurrences: c.total_occurrences(),
            resource_count: c.resources().len(),
            resource_bytes: resources::total_size(c.resources()),
        })
        .collect();

    let discarded_samples = selected
        .iter()
        .flat_map(|c| c.discarded_by(&options.filter))
        .take(DISCARDED_SAMPLE_SIZE)
        .map(str::to_string)
        .collect();

    let recommendations = recommend(&fragment_dups, &resource_duplicates, &high_similarity);

    Ok(SimilarityReport {
        metadata: ReportMetadata {
            generated_at: Utc::now(),
            apps: selected.iter().map(|c| c.app().to_string()).collect(),
            filter_enabled: options.filter.is_enabled(),
            excluded_categories: options.excluded_categories.clone(),
            filter_statistics: options.filter.statistics(),
        },
        matrix,
        pairs,
        high_similarity,
        duplicates: fragment_dups,
        top_duplicates,
        resource_duplicates,
        category_histograms,
        resource_types,
        app_summaries,
        discarded_samples,
        recommendations,
    })
}

/// Fixed-threshold recommendations derived from the report numbers.
pub fn recommend(
    duplicates: &DuplicateAnalysis,
    resource_dups: &ResourceDuplicateAnalysis,
    high_similarity: &[PairSimilarity],
) -> Vec<String> {
    let mut out = Vec::new();

    let rate = duplicates.statistics.duplication_rate;
    if rate > HIGH_DUPLICATION_RATE {
        out.push(format!(
            "Fragment duplication rate is {rate:.1}%; extract the shared strings into a common resource"
        ));
    } else if rate > MODERATE_DUPLICATION_RATE {
        out.push(format!(
            "Fragment duplication rate is {rate:.1}%; consider consolidating shared strings"
        ));
    }

    if resource_dups.potential_savings > SAVINGS_RECOMMENDATION_BYTES {
        let mb = resource_dups.potential_savings as f64 / (1024.0 * 1024.0);
        out.push(format!(
            "Removing {} duplicate resource files would save about {mb:.1} MB",
            resource_dups.redundant_files
        ));
    }

    if !high_similarity.is_empty() {
        out.push(format!(
            "{} app pair(s) are highly similar; check whether they can be merged or share components",
            high_similarity.len()
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::scanner::ScanOutput;

    fn corpus(app: &str, id: Option<&str>, frags: &[&str]) -> Corpus {
        let scan = ScanOutput {
            occurrences: frags.iter().map(|f| (f.to_string(), 1)).collect(),
        };
        Corpus::build(app, id.map(str::to_string), 0, scan, Vec::new())
    }

    #[test]
    fn test_insufficient_input() {
        let one = vec![corpus("a", None, &["Login Failed"])];
        let err = build_report(&one, &ComparisonOptions::default()).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::InsufficientInput {
                available: 1,
                required: 2
            }
        );
        assert!(build_report(&[], &ComparisonOptions::default()).is_err());
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let corpora = vec![
            corpus("a", Some("com.acme.app"), &["Login Failed", "Welcome back"]),
            corpus("b", Some("com.acme.widget"), &["Login Failed", "Goodbye now"]),
        ];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();

        assert_eq!(report.scores("a", "b"), report.scores("b", "a"));
        assert_eq!(report.scores("a", "a").unwrap().lexical, 100.0);
        let ab = report.scores("a", "b").unwrap();
        assert_eq!(ab.lexical, 33.33);
        assert_eq!(ab.identifier, 66.67);
        // No resources on either side: two empty sets are identical
        assert_eq!(ab.resource, 100.0);
        assert_eq!(report.pairs.len(), 1);
    }

    #[test]
    fn test_subset_restriction_and_unknown_names() {
        let corpora = vec![
            corpus("a", None, &["Login Failed"]),
            corpus("b", None, &["Login Failed"]),
            corpus("c", None, &["Something else"]),
        ];
        let options = ComparisonOptions {
            apps: Some(vec!["a".into(), "b".into(), "ghost".into()]),
            ..Default::default()
        };
        let report = build_report(&corpora, &options).unwrap();
        assert_eq!(report.metadata.apps, vec!["a", "b"]);
        assert_eq!(report.high_similarity.len(), 1);

        let options = ComparisonOptions {
            apps: Some(vec!["a".into(), "ghost".into()]),
            ..Default::default()
        };
        assert!(matches!(
            build_report(&corpora, &options),
            Err(SimilarityError::InsufficientInput { available: 1, .. })
        ));
    }

    #[test]
    fn test_recommendations_thresholds() {
        let corpora = vec![
            corpus("a", None, &["Login Failed", "Tap to retry"]),
            corpus("b", None, &["Login Failed", "Tap to retry"]),
        ];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();
        // 2 duplicates over 4 occurrences = 50%, not above the high mark
        assert_eq!(report.duplicates.statistics.duplication_rate, 50.0);
        assert!(report.recommendations[0].contains("consider consolidating"));
        assert!(report.recommendations.iter().any(|r| r.contains("highly similar")));
    }

    #[test]
    fn test_filter_statistics_and_resource_types() {
        use crate::resources::ResourceFile;

        let file = |name: &str, category: &str| ResourceFile {
            name: name.to_string(),
            size: 10,
            category: category.to_string(),
            path: name.to_string(),
        };
        fn scan(frags: &[&str]) -> ScanOutput {
            ScanOutput {
                occurrences: frags.iter().map(|f| (f.to_string(), 1)).collect(),
            }
        }
        let corpora = vec![
            Corpus::build(
                "a",
                None,
                0,
                scan(&["Login Failed"]),
                vec![file("a.png", "images"), file("b.png", "images"), file("c.wav", "audio")],
            ),
            Corpus::build("b", None, 0, scan(&["Login Failed"]), Vec::new()),
        ];

        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();
        let stats = &report.metadata.filter_statistics;
        assert!(stats.filter_enabled);
        assert_eq!(stats.min_length, 3);
        assert!(stats.common_words_count > 0);
        assert!(stats.filters_applied.iter().any(|f| f == "common-word"));

        assert_eq!(report.resource_types["a"]["images"], 2);
        assert_eq!(report.resource_types["a"]["audio"], 1);
        assert!(report.resource_types["b"].is_empty());

        let options = ComparisonOptions {
            filter: NoiseFilter::new(false),
            ..Default::default()
        };
        let unfiltered = build_report(&corpora, &options).unwrap();
        assert!(!unfiltered.metadata.filter_statistics.filter_enabled);
        assert!(unfiltered.metadata.filter_statistics.filters_applied.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let corpora = vec![
            corpus("a", None, &["Login Failed"]),
            corpus("b", None, &["Login Failed"]),
        ];
        let report = build_report(&corpora, &ComparisonOptions::default()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let back: SimilarityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.apps, report.metadata.apps);
        assert_eq!(back.duplicates, report.duplicates);
    }
}
