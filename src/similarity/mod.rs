// Cross-corpus similarity — overlap metrics, composite scoring, and the
// report that ties them to the duplicate analysis.

pub mod overlap;
pub mod report;
pub mod score;

pub use report::{build_report, ComparisonOptions, SimilarityError, SimilarityReport};
