// Lexical extraction — scanning, classification, and noise filtering.
//
// Everything in here is pure over its inputs: bytes in, fragments out;
// fragment in, category or filter decision out.

pub mod category;
pub mod classifier;
pub mod noise;
pub mod scanner;
