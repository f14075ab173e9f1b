// Sift: lexical extraction and cross-corpus similarity for app binaries
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: bytes -> fragments -> corpus -> similarity report.

pub mod config;
pub mod corpus;
pub mod db;
pub mod lexical;
pub mod output;
pub mod pipeline;
pub mod resources;
pub mod similarity;
pub mod status;
