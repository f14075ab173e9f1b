// Unit tests for the similarity layer: set overlap, identifier prefixes,
// score rounding, and duplicate aggregation.

use std::collections::{BTreeMap, BTreeSet};

use sift::corpus::duplicates::{aggregate, aggregate_resources};
use sift::resources::ResourceFile;
use sift::similarity::overlap::{jaccard, prefix_similarity, to_percent};
use sift::similarity::score::{PairScores, SimilarityWeights};

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sets(apps: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
    apps.iter()
        .map(|(app, frags)| (app.to_string(), set(frags)))
        .collect()
}

fn resource(name: &str, size: u64) -> ResourceFile {
    ResourceFile {
        name: name.to_string(),
        size,
        category: sift::resources::categorize_file(name).to_string(),
        path: name.to_string(),
    }
}

// ============================================================
// Jaccard
// ============================================================

#[test]
fn jaccard_is_symmetric_and_bounded() {
    let a = set(&["Login Failed", "Cancel", "Welcome"]);
    let b = set(&["Cancel", "Goodbye"]);
    let ab = jaccard(&a, &b);
    assert_eq!(ab, jaccard(&b, &a));
    assert!((0.0..=1.0).contains(&ab));
    assert!((ab - 0.25).abs() < 1e-9);
}

#[test]
fn jaccard_identity_and_disjoint() {
    let a = set(&["one", "two"]);
    assert_eq!(jaccard(&a, &a), 1.0);
    assert_eq!(jaccard(&a, &set(&["three"])), 0.0);
    assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
    assert_eq!(jaccard(&a, &set(&[])), 0.0);
}

// ============================================================
// Identifier prefix
// ============================================================

#[test]
fn shared_vendor_prefix_is_two_thirds() {
    let p = prefix_similarity(Some("com.acme.app"), Some("com.acme.widget"));
    assert_eq!(to_percent(p), 66.67);
}

#[test]
fn prefix_uses_longer_segment_count() {
    let p = prefix_similarity(Some("com.acme"), Some("com.acme.app.extension"));
    assert!((p - 0.5).abs() < 1e-9);
    assert_eq!(prefix_similarity(Some("org.x"), Some("com.x")), 0.0);
}

#[test]
fn missing_identifier_scores_zero() {
    assert_eq!(prefix_similarity(None, Some("com.acme.app")), 0.0);
    assert_eq!(prefix_similarity(Some(""), Some("")), 0.0);
    assert_eq!(prefix_similarity(None, None), 0.0);
}

// ============================================================
// Scores
// ============================================================

#[test]
fn percentages_round_to_two_decimals() {
    assert_eq!(to_percent(1.0 / 3.0), 33.33);
    assert_eq!(to_percent(1.0), 100.0);
    assert_eq!(to_percent(0.0), 0.0);
}

#[test]
fn composite_uses_weights() {
    let s = PairScores::from_fractions(1.0, 0.5, 0.0, &SimilarityWeights::default());
    assert_eq!(s.lexical, 100.0);
    assert_eq!(s.resource, 50.0);
    assert_eq!(s.composite, 55.0);
}

#[test]
fn high_similarity_is_strictly_above_eighty() {
    let w = SimilarityWeights::default();
    assert!(!PairScores::from_fractions(0.8, 0.0, 0.0, &w).is_high_similarity());
    assert!(PairScores::from_fractions(0.81, 0.0, 0.0, &w).is_high_similarity());
}

#[test]
fn high_similarity_uses_unrounded_fraction() {
    // Displays as 80.0 but the raw overlap is above the threshold
    let s = PairScores::from_fractions(0.80004, 0.0, 0.0, &SimilarityWeights::default());
    assert_eq!(s.lexical, 80.0);
    assert!(s.is_high_similarity());

    let just_under = PairScores::from_fractions(0.79996, 0.0, 0.0, &SimilarityWeights::default());
    assert_eq!(just_under.lexical, 80.0);
    assert!(!just_under.is_high_similarity());
}

// ============================================================
// Duplicate aggregation
// ============================================================

#[test]
fn three_app_duplicate_scenario() {
    let analysis = aggregate(&sets(&[
        ("a", &["Login Failed", "OK", "v1.2.3"]),
        ("b", &["Login Failed", "Cancel"]),
        ("c", &["Login Failed", "OK"]),
    ]));

    assert_eq!(analysis.groups[&3][0].content, "Login Failed");
    assert_eq!(analysis.groups[&3][0].apps, vec!["a", "b", "c"]);
    assert_eq!(analysis.groups[&2][0].content, "OK");
    assert!(!analysis.groups.contains_key(&1));

    let stats = &analysis.statistics;
    assert_eq!(stats.total_occurrences, 7);
    assert_eq!(stats.unique_fragments, 4);
    assert_eq!(stats.duplicate_count, 3);
    assert!((stats.duplication_rate - 300.0 / 7.0).abs() < 1e-9);
}

#[test]
fn duplicate_count_never_exceeds_total() {
    let analysis = aggregate(&sets(&[
        ("a", &["x1", "x2"]),
        ("b", &["x1", "x2"]),
        ("c", &["x1", "x2"]),
    ]));
    let stats = &analysis.statistics;
    assert!(stats.duplicate_count <= stats.total_occurrences);
    assert!(stats.duplication_rate >= 0.0 && stats.duplication_rate <= 100.0);
}

#[test]
fn no_corpora_means_zero_rate() {
    let analysis = aggregate(&BTreeMap::new());
    assert_eq!(analysis.statistics.duplication_rate, 0.0);
    assert!(analysis.groups.is_empty());
}

#[test]
fn top_list_ranks_by_count_then_length() {
    let analysis = aggregate(&sets(&[
        ("a", &["short", "a much longer line", "everywhere"]),
        ("b", &["short", "a much longer line", "everywhere"]),
        ("c", &["everywhere"]),
    ]));
    let top: Vec<String> = analysis.top(10).into_iter().map(|e| e.content).collect();
    assert_eq!(top, vec!["everywhere", "a much longer line", "short"]);
    assert_eq!(analysis.top(1).len(), 1);
}

#[test]
fn resource_duplicates_match_name_and_size() {
    let a = vec![resource("logo.png", 2048), resource("click.wav", 100)];
    let b = vec![resource("logo.png", 2048), resource("click.wav", 101)];
    let analysis = aggregate_resources([("a", a.as_slice()), ("b", b.as_slice())]);

    assert_eq!(analysis.duplicates.len(), 1);
    assert_eq!(analysis.duplicates[0].name, "logo.png");
    assert_eq!(analysis.duplicates[0].category, "images");
    assert_eq!(analysis.redundant_files, 1);
    assert_eq!(analysis.potential_savings, 2048);
}
