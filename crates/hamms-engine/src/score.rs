use hamms_core::Dimension;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How compatible two tracks are, from 0 (maximally distant) to 1
/// (identical), optionally with the per-dimension terms behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    breakdown: Option<Breakdown>,
}

impl CompatibilityScore {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            value,
            breakdown: None,
        }
    }

    pub(crate) fn with_breakdown(value: f64, breakdown: Breakdown) -> Self {
        Self {
            value,
            breakdown: Some(breakdown),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        self.breakdown.as_ref()
    }

    /// Total order on the score value alone.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

/// One dimension's part in a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub dimension: Dimension,
    /// Per-dimension distance in [0, 1].
    pub distance: f64,
    pub weight: f64,
    /// `weight * distance^2 / total weight`. The shares sum to the squared
    /// overall distance.
    pub weighted_share: f64,
}

/// Per-dimension contributions in vector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    contributions: Vec<Contribution>,
}

impl Breakdown {
    pub(crate) fn new(contributions: Vec<Contribution>) -> Self {
        Self { contributions }
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn get(&self, dimension: Dimension) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.dimension == dimension)
    }

    /// The dimension pulling the tracks furthest apart, if any differ.
    pub fn dominant(&self) -> Option<&Contribution> {
        self.contributions
            .iter()
            .filter(|c| c.weighted_share > 0.0)
            .max_by(|a, b| a.weighted_share.total_cmp(&b.weighted_share))
    }
}
