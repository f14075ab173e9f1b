// Corpus — one application's classified fragment set, built once.
//
// A corpus always holds the unfiltered extraction output. The noise filter
// and any category exclusions are applied only when a comparison set is
// requested, so the same stored corpus can be compared with or without
// filtering.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::lexical::category::Category;
use crate::lexical::classifier;
use crate::lexical::noise::NoiseFilter;
use crate::lexical::scanner::ScanOutput;
use crate::resources::{self, ResourceFile};

/// Cap on the within-corpus repeated-fragment table.
pub const REPEATED_TABLE_LIMIT: usize = 50;

/// Length of the most-frequent fragment list.
pub const TOP_FRAGMENT_LIMIT: usize = 20;

/// A fragment and its raw occurrence count within one binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentCount {
    pub content: String,
    pub count: u32,
}

/// Length and encoding statistics over a corpus's unique fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    pub total_chars: usize,
    pub ascii_fragments: usize,
    pub non_ascii_fragments: usize,
    pub ascii_percentage: f64,
    pub histogram: BTreeMap<Category, usize>,
}

/// The per-application extraction result handed to reporting and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub app: String,
    pub identifier: Option<String>,
    pub total_occurrences: u64,
    pub unique_count: usize,
    pub categories: BTreeMap<Category, Vec<String>>,
    pub repeated: Vec<FragmentCount>,
    pub top_fragments: Vec<FragmentCount>,
    pub stats: ExtractionStats,
    pub resource_count: usize,
    pub resource_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    app: String,
    identifier: Option<String>,
    binary_size: u64,
    fragments: BTreeMap<String, Category>,
    occurrences: BTreeMap<String, u32>,
    #[serde(default)]
    resources: Vec<ResourceFile>,
}

impl Corpus {
    /// Classify a scan's fragments and freeze them into a corpus.
    pub fn build(
        app: impl Into<String>,
        identifier: Option<String>,
        binary_size: u64,
        scan: ScanOutput,
        resources: Vec<ResourceFile>,
    ) -> Self {
        let fragments = scan
            .occurrences
            .keys()
            .map(|text| (text.clone(), classifier::classify(text)))
            .collect();

        Self {
            app: app.into(),
            identifier: identifier.filter(|id| !id.trim().is_empty()),
            binary_size,
            fragments,
            occurrences: scan.occurrences,
            resources,
        }
    }

    /// A corpus with no fragments, used when extraction fails.
    pub fn empty(app: impl Into<String>, identifier: Option<String>) -> Self {
        Self::build(app, identifier, 0, ScanOutput::default(), Vec::new())
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn binary_size(&self) -> u64 {
        self.binary_size
    }

    pub fn resources(&self) -> &[ResourceFile] {
        &self.resources
    }

    /// Fragment text to its category.
    pub fn fragments(&self) -> &BTreeMap<String, Category> {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn unique_count(&self) -> usize {
        self.fragments.len()
    }

    /// Sum of raw run counts across all fragments.
    pub fn total_occurrences(&self) -> u64 {
        self.occurrences.values().map(|&c| c as u64).sum()
    }

    pub fn histogram(&self) -> BTreeMap<Category, usize> {
        let mut histogram = BTreeMap::new();
        for category in self.fragments.values() {
            *histogram.entry(*category).or_insert(0) += 1;
        }
        histogram
    }

    /// Category to its fragments, each list in sorted order.
    pub fn categorized(&self) -> BTreeMap<Category, Vec<String>> {
        let mut grouped: BTreeMap<Category, Vec<String>> = BTreeMap::new();
        for (text, category) in &self.fragments {
            grouped.entry(*category).or_default().push(text.clone());
        }
        grouped
    }

    /// Fragments seen more than once in the binary, most frequent first.
    pub fn repeated_fragments(&self, limit: usize) -> Vec<FragmentCount> {
        self.ranked_counts()
            .into_iter()
            .filter(|f| f.count > 1)
            .take(limit)
            .collect()
    }

    /// The most frequent fragments regardless of count.
    pub fn top_fragments(&self, limit: usize) -> Vec<FragmentCount> {
        self.ranked_counts().into_iter().take(limit).collect()
    }

    fn ranked_counts(&self) -> Vec<FragmentCount> {
        let mut ranked: Vec<FragmentCount> = self
            .occurrences
            .iter()
            .map(|(content, &count)| FragmentCount {
                content: content.clone(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.content.cmp(&b.content)));
        ranked
    }

    pub fn stats(&self) -> ExtractionStats {
        let lengths: Vec<usize> = self.fragments.keys().map(|t| t.chars().count()).collect();
        let total_chars: usize = lengths.iter().sum();
        let ascii_fragments = self.fragments.keys().filter(|t| t.is_ascii()).count();
        let count = lengths.len();

        ExtractionStats {
            min_length: lengths.iter().copied().min().unwrap_or(0),
            max_length: lengths.iter().copied().max().unwrap_or(0),
            mean_length: if count > 0 {
                total_chars as f64 / count as f64
            } else {
                0.0
            },
            total_chars,
            ascii_fragments,
            non_ascii_fragments: count - ascii_fragments,
            ascii_percentage: if count > 0 {
                ascii_fragments as f64 / count as f64 * 100.0
            } else {
                0.0
            },
            histogram: self.histogram(),
        }
    }

    pub fn summary(&self) -> ExtractionSummary {
        ExtractionSummary {
            app: self.app.clone(),
            identifier: self.identifier.clone(),
            total_occurrences: self.total_occurrences(),
            unique_count: self.unique_count(),
            categories: self.categorized(),
            repeated: self.repeated_fragments(REPEATED_TABLE_LIMIT),
            top_fragments: self.top_fragments(TOP_FRAGMENT_LIMIT),
            stats: self.stats(),
            resource_count: self.resources.len(),
            resource_bytes: resources::total_size(&self.resources),
        }
    }

    /// The fragment set used for cross-corpus comparison.
    pub fn comparison_set(&self, filter: &NoiseFilter, excluded: &[Category]) -> BTreeSet<String> {
        self.fragments
            .iter()
            .filter(|(_, category)| !excluded.contains(category))
            .filter(|(text, _)| !filter.is_noise(text))
            .map(|(text, _)| text.clone())
            .collect()
    }

    /// Fragments the filter would discard, in sorted order.
    pub fn discarded_by<'a>(&'a self, filter: &'a NoiseFilter) -> impl Iterator<Item = &'a str> {
        self.fragments
            .keys()
            .map(String::as_str)
            .filter(move |text| filter.is_noise(text))
    }

    /// Resource file names, for resource-set similarity.
    pub fn resource_names(&self) -> BTreeSet<String> {
        self.resources.iter().map(|r| r.name.clone()).collect()
    }
}
