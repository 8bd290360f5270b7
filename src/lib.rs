// Thatch: astroturf detection for FCC docket comments.
//
// This is the library root. Each module corresponds to one stage of the
// comment-clustering pipeline: sample, vectorize, cluster, evaluate.

pub mod cache;
pub mod cluster;
pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod manifest;
pub mod output;
pub mod status;
pub mod vectorize;
