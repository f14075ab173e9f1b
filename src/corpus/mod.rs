// Corpora and cross-corpus duplicate aggregation.

pub mod duplicates;
pub mod model;

pub use model::Corpus;
