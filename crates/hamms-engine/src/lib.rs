//! Compatibility scoring for hamms.
//!
//! The [`SimilarityEngine`] compares normalized feature vectors with a
//! weighted Euclidean distance, treating the key dimension as a position on
//! the Camelot wheel, and ranks candidate tracks against a query track.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod batch;
pub mod config;
pub mod engine;
pub mod score;

pub use batch::{build_batch, BatchOutcome};
pub use config::Config;
pub use engine::{RankOptions, SimilarityEngine};
pub use score::{Breakdown, CompatibilityScore, Contribution};
