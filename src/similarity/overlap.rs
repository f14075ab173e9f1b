// Set overlap metrics used by the similarity matrix.
//
// Plain (unweighted) Jaccard over fragment or resource-name sets:
//
//   |A ∩ B| / |A ∪ B|
//
// Two empty sets are identical (1.0). The identifier metric compares dotted
// identifiers segment by segment from the left.

use std::collections::BTreeSet;

/// Jaccard similarity between two sets, from 0.0 to 1.0.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Common leading segments of two dotted identifiers over the longer
/// segment count. Zero when either identifier is missing or blank.
///
/// `com.acme.app` vs `com.acme.widget` is 2/3.
pub fn prefix_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    if a.trim().is_empty() || b.trim().is_empty() {
        return 0.0;
    }

    let segments_a: Vec<&str> = a.split('.').collect();
    let segments_b: Vec<&str> = b.split('.').collect();

    let common = segments_a
        .iter()
        .zip(&segments_b)
        .take_while(|(x, y)| x == y)
        .count();
    let longest = segments_a.len().max(segments_b.len());

    common as f64 / longest as f64
}

/// Convert a 0-1 fraction to a percentage rounded to two decimals.
pub fn to_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = set(&["one", "two", "three"]);
        let b = set(&["two", "three", "four"]);
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_empty_sets() {
        let empty = set(&[]);
        assert_eq!(jaccard(&empty, &empty), 1.0);
        assert_eq!(jaccard(&empty, &set(&["x"])), 0.0);
    }

    #[test]
    fn test_prefix_similarity() {
        let score = prefix_similarity(Some("com.acme.app"), Some("com.acme.widget"));
        assert_eq!(to_percent(score), 66.67);
        assert_eq!(prefix_similarity(Some("com.acme"), None), 0.0);
        assert_eq!(prefix_similarity(Some("org.acme.app"), Some("com.acme.app")), 0.0);
        assert_eq!(prefix_similarity(Some("com.acme"), Some("com.acme.app.pro")), 0.5);
    }

    #[test]
    fn test_to_percent_rounds() {
        assert_eq!(to_percent(1.0), 100.0);
        assert_eq!(to_percent(1.0 / 3.0), 33.33);
        assert_eq!(to_percent(0.0), 0.0);
    }
}
