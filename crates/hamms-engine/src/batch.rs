//! Building vectors for a whole batch of tracks.
//!
//! A track whose descriptors fail validation is reported and skipped; it
//! never aborts the rest of the batch. Whether a failed track is excluded
//! from ranking is the caller's call.

use hamms_core::{build_feature_vector, FeatureVector, RawDescriptors, ValidationError};
use std::fmt;

/// Vectors built from a batch, plus the tracks that failed validation.
#[derive(Debug, Clone)]
pub struct BatchOutcome<Id> {
    pub vectors: Vec<(Id, FeatureVector)>,
    pub failures: Vec<(Id, ValidationError)>,
}

impl<Id> Default for BatchOutcome<Id> {
    fn default() -> Self {
        Self {
            vectors: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<Id> BatchOutcome<Id> {
    /// True when every track produced a vector.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Split the built vectors into parallel id and vector lists, so that
    /// indices returned by ranking map straight back to track ids.
    pub fn split(self) -> (Vec<Id>, Vec<FeatureVector>) {
        self.vectors.into_iter().unzip()
    }
}

/// Build a feature vector for each `(track id, descriptors)` pair.
///
/// Successful vectors keep input order, as do failures.
pub fn build_batch<Id, I>(items: I) -> BatchOutcome<Id>
where
    Id: fmt::Display,
    I: IntoIterator<Item = (Id, RawDescriptors)>,
{
    let mut outcome = BatchOutcome::default();

    for (id, raw) in items {
        match build_feature_vector(raw) {
            Ok(vector) => outcome.vectors.push((id, vector)),
            Err(e) => {
                log::warn!("Skipping track {}: {}", id, e);
                outcome.failures.push((id, e));
            }
        }
    }

    log::info!(
        "Batch complete: {} vectors built, {} tracks rejected",
        outcome.vectors.len(),
        outcome.failures.len()
    );

    outcome
}
