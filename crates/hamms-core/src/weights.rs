//! Per-dimension weight profiles.
//!
//! A profile is plain configuration handed to a scoring engine at
//! construction time. Weights are arbitrary positive reals; the distance
//! formula divides by their sum, so only their ratios matter.
//!
//! In TOML a profile is a table keyed by dimension name. Dimensions left
//! out keep their default weight:
//!
//! ```toml
//! key = 1.6
//! tempo = 1.3
//! acousticness = 0.4
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::dimension::{Dimension, DIMENSION_COUNT};
use crate::error::{Error, Result};
use crate::lenient::Lenient;

/// Default weights, indexed like [`Dimension::ALL`]. Key and tempo matter
/// most for mixing; acousticness least.
const DEFAULT_WEIGHTS: [f64; DIMENSION_COUNT] = [
    1.3, // tempo
    1.4, // key
    1.2, // energy
    1.0, // danceability
    0.9, // valence
    0.6, // acousticness
    0.7, // instrumentalness
    1.0, // rhythmic_pattern
    0.8, // spectral_centroid
    0.8, // tempo_stability
    0.9, // harmonic_complexity
    0.7, // dynamic_range
];

/// Positive weight per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Lenient<f64>>",
    into = "BTreeMap<String, f64>"
)]
pub struct WeightProfile {
    weights: [f64; DIMENSION_COUNT],
}

impl Default for WeightProfile {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl WeightProfile {
    /// Every dimension weighted 1.0.
    #[must_use]
    pub fn uniform() -> Self {
        Self {
            weights: [1.0; DIMENSION_COUNT],
        }
    }

    /// Build from an array in dimension order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] for the first weight that is not
    /// positive and finite.
    pub fn from_array(weights: [f64; DIMENSION_COUNT]) -> Result<Self> {
        let profile = Self { weights };
        profile.validate()?;
        Ok(profile)
    }

    /// Replace one weight. Not checked until [`WeightProfile::validate`].
    #[must_use]
    pub fn with(mut self, dimension: Dimension, weight: f64) -> Self {
        self.weights[dimension.index()] = weight;
        self
    }

    /// Check that every weight is positive and finite, and that their sum
    /// is finite too.
    pub fn validate(&self) -> Result<()> {
        for (dimension, weight) in self.iter() {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(Error::InvalidWeight { dimension, weight });
            }
        }
        // A sum of +inf would turn every distance into zero.
        if !self.total().is_finite() {
            return Err(Error::InvalidData(format!(
                "total weight overflows: {}",
                self.total()
            )));
        }
        Ok(())
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.weights[dimension.index()]
    }

    pub fn as_array(&self) -> &[f64; DIMENSION_COUNT] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().copied().zip(self.weights.iter().copied())
    }

    /// Load a profile from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, names an
    /// unknown dimension, or holds an invalid weight.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let profile: Self = toml::from_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "failed to parse weight profile from {}: {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Loaded weight profile from {}", path.display());
        Ok(profile)
    }
}

impl TryFrom<BTreeMap<String, Lenient<f64>>> for WeightProfile {
    type Error = Error;

    fn try_from(table: BTreeMap<String, Lenient<f64>>) -> Result<Self> {
        let mut profile = Self::default();
        for (name, weight) in table {
            let dimension: Dimension = name.parse()?;
            let weight = weight
                .into_value()
                .map_err(|e| Error::InvalidData(format!("weight for {}: {}", dimension, e)))?;
            profile = profile.with(dimension, weight);
        }
        profile.validate()?;
        Ok(profile)
    }
}

impl From<WeightProfile> for BTreeMap<String, f64> {
    fn from(profile: WeightProfile) -> Self {
        profile
            .iter()
            .map(|(dimension, weight)| (dimension.name().to_string(), weight))
            .collect()
    }
}
