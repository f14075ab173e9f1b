// Pipelines — batch extraction and cross-corpus comparison.

pub mod comparison;
pub mod extraction;
