// Composite similarity score for one pair of applications.
//
// Three independent signals are combined with a fixed weighting:
//
//   composite = lexical * 0.4 + resource * 0.3 + identifier * 0.3
//
// All four numbers are reported as percentages with two decimals.

use serde::{Deserialize, Serialize};

use super::overlap::to_percent;

/// Lexical similarity above this fraction flags a pair as near-identical.
pub const HIGH_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Weights for the composite score. They sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Fragment-set Jaccard (default 0.4)
    pub lexical: f64,
    /// Resource-name Jaccard (default 0.3)
    pub resource: f64,
    /// Identifier common-prefix ratio (default 0.3)
    pub identifier: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            lexical: 0.4,
            resource: 0.3,
            identifier: 0.3,
        }
    }
}

/// Scores for one cell of the similarity matrix, as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairScores {
    pub lexical: f64,
    pub resource: f64,
    pub identifier: f64,
    pub composite: f64,
    /// Raw lexical fraction above the threshold, decided before rounding.
    #[serde(default)]
    pub high_similarity: bool,
}

impl PairScores {
    /// Combine raw 0-1 fractions into rounded percentages.
    pub fn from_fractions(
        lexical: f64,
        resource: f64,
        identifier: f64,
        weights: &SimilarityWeights,
    ) -> Self {
        let composite =
            lexical * weights.lexical + resource * weights.resource + identifier * weights.identifier;
        Self {
            lexical: to_percent(lexical),
            resource: to_percent(resource),
            identifier: to_percent(identifier),
            composite: to_percent(composite),
            high_similarity: lexical > HIGH_SIMILARITY_THRESHOLD,
        }
    }

    pub fn is_high_similarity(&self) -> bool {
        self.high_similarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = SimilarityWeights::default();
        assert!((w.lexical + w.resource + w.identifier - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_formula() {
        let scores = PairScores::from_fractions(0.5, 1.0, 2.0 / 3.0, &SimilarityWeights::default());
        // 0.5*0.4 + 1.0*0.3 + 0.6667*0.3 = 0.2 + 0.3 + 0.2 = 0.7
        assert_eq!(scores.composite, 70.0);
        assert_eq!(scores.identifier, 66.67);
        assert!(!scores.is_high_similarity());
    }

    #[test]
    fn test_high_similarity_is_strictly_above_threshold() {
        let w = SimilarityWeights::default();
        assert!(!PairScores::from_fractions(0.8, 0.0, 0.0, &w).is_high_similarity());
        assert!(PairScores::from_fractions(0.81, 0.0, 0.0, &w).is_high_similarity());
    }

    #[test]
    fn test_threshold_ignores_display_rounding() {
        let scores = PairScores::from_fractions(0.80004, 0.0, 0.0, &SimilarityWeights::default());
        assert_eq!(scores.lexical, 80.0);
        assert!(scores.is_high_similarity());
    }
}
