//! The normalized, immutable twelve-dimension feature vector.
//!
//! # Example
//!
//! ```
//! use hamms_core::{build_feature_vector, Dimension, RawDescriptors};
//!
//! let raw = RawDescriptors::new()
//!     .with_tempo(128.0)
//!     .with_key("8A".parse::<hamms_core::CamelotKey>().unwrap())
//!     .with(Dimension::Energy, 0.8)
//!     .with(Dimension::Danceability, 0.7)
//!     .with(Dimension::Valence, 0.5)
//!     .with(Dimension::Acousticness, 0.1)
//!     .with(Dimension::Instrumentalness, 0.6)
//!     .with(Dimension::RhythmicPattern, 0.4)
//!     .with(Dimension::SpectralCentroid, 2400.0)
//!     .with(Dimension::TempoStability, 0.9)
//!     .with(Dimension::HarmonicComplexity, 0.3)
//!     .with(Dimension::DynamicRange, 8.0);
//!
//! let vector = build_feature_vector(raw).unwrap();
//! assert_eq!(vector.get(Dimension::Key), 7.0 / 12.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::descriptors::RawDescriptors;
use crate::dimension::{Dimension, DIMENSION_COUNT, DIMENSION_SPECS};
use crate::error::{Error, Result, ValidationError};

/// Version tag written alongside persisted vectors.
pub const SCHEMA_VERSION: u32 = 1;

/// Twelve normalized components, each in [0, 1], in [`Dimension::ALL`] order.
///
/// There is no way to mutate a vector once built; re-analysis of a track
/// produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredVector", into = "StoredVector")]
pub struct FeatureVector {
    values: [f64; DIMENSION_COUNT],
}

/// Normalize raw descriptors into a [`FeatureVector`].
///
/// Dimensions are processed in vector order and the first failure is
/// returned.
///
/// # Errors
///
/// [`ValidationError::MissingDimension`] if a field is absent;
/// [`ValidationError::OutOfRange`] if a pre-bounded value is outside [0, 1],
/// the key is not on the wheel, or any value is not finite.
pub fn build_feature_vector(raw: RawDescriptors) -> std::result::Result<FeatureVector, ValidationError> {
    let mut values = [0.0; DIMENSION_COUNT];
    for spec in &DIMENSION_SPECS {
        let dimension = spec.dimension;
        let measured = raw.measurement(dimension)?;
        values[dimension.index()] = spec.normalization.apply(dimension, measured)?;
    }
    log::trace!("Built feature vector {:?}", values);
    Ok(FeatureVector { values })
}

impl FeatureVector {
    /// See [`build_feature_vector`].
    pub fn build(raw: RawDescriptors) -> std::result::Result<Self, ValidationError> {
        build_feature_vector(raw)
    }

    /// Reconstruct a vector from already-normalized components, e.g. when
    /// loading from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] for the first component that
    /// is not a finite value in [0, 1], or a key component that is at or
    /// past the end of the wheel.
    pub fn try_from_array(values: [f64; DIMENSION_COUNT]) -> std::result::Result<Self, ValidationError> {
        for dimension in Dimension::ALL {
            let value = values[dimension.index()];
            let upper_ok = if dimension == Dimension::Key {
                value < 1.0
            } else {
                value <= 1.0
            };
            if !(value.is_finite() && value >= 0.0 && upper_ok) {
                return Err(ValidationError::OutOfRange { dimension, value });
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.values[dimension.index()]
    }

    /// Component by position, or `None` past the last dimension.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn as_array(&self) -> &[f64; DIMENSION_COUNT] {
        &self.values
    }

    /// Components paired with their dimension, in vector order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.iter().copied().zip(self.values.iter().copied())
    }

    /// Encode as JSON with the schema version tag.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a vector previously written by [`FeatureVector::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<[f64; DIMENSION_COUNT]> for FeatureVector {
    type Error = ValidationError;

    fn try_from(values: [f64; DIMENSION_COUNT]) -> std::result::Result<Self, Self::Error> {
        Self::try_from_array(values)
    }
}

/// Persisted layout: a version tag plus the components in dimension order.
#[derive(Debug, Serialize, Deserialize)]
struct StoredVector {
    schema_version: u32,
    values: Vec<f64>,
}

impl From<FeatureVector> for StoredVector {
    fn from(vector: FeatureVector) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            values: vector.values.to_vec(),
        }
    }
}

impl TryFrom<StoredVector> for FeatureVector {
    type Error = Error;

    fn try_from(stored: StoredVector) -> Result<Self> {
        if stored.schema_version != SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema {
                found: stored.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        let len = stored.values.len();
        let values: [f64; DIMENSION_COUNT] = stored.values.try_into().map_err(|_| {
            Error::InvalidData(format!(
                "feature vector has {} components, expected {}",
                len, DIMENSION_COUNT
            ))
        })?;
        Ok(Self::try_from_array(values)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::CamelotKey;

    fn full_raw() -> RawDescriptors {
        RawDescriptors::new()
            .with_tempo(128.0)
            .with_key("8A".parse::<CamelotKey>().unwrap())
            .with(Dimension::Energy, 0.8)
            .with(Dimension::Danceability, 0.75)
            .with(Dimension::Valence, 0.4)
            .with(Dimension::Acousticness, 0.05)
            .with(Dimension::Instrumentalness, 0.9)
            .with(Dimension::RhythmicPattern, 0.6)
            .with(Dimension::SpectralCentroid, 3000.0)
            .with(Dimension::TempoStability, 0.95)
            .with(Dimension::HarmonicComplexity, 0.35)
            .with(Dimension::DynamicRange, 7.5)
    }

    #[test]
    fn test_build_normalizes_each_dimension() {
        let vector = build_feature_vector(full_raw()).unwrap();
        assert!((vector.get(Dimension::Tempo) - 68.0 / 140.0).abs() < 1e-12);
        assert_eq!(vector.get(Dimension::Key), 7.0 / 12.0);
        assert_eq!(vector.get(Dimension::Energy), 0.8);
        assert_eq!(vector.get(Dimension::SpectralCentroid), 3000.0 / 8000.0);
        assert_eq!(vector.get(Dimension::DynamicRange), 7.5 / 30.0);
        assert_eq!(vector.value(0), Some(vector.get(Dimension::Tempo)));
        assert!(vector.value(12).is_none());
    }

    #[test]
    fn test_all_components_in_unit_range() {
        let tempos = [-10.0, 0.0, 59.9, 60.0, 95.5, 128.0, 174.0, 200.0, 250.0, 1e6];
        let centroids = [-5.0, 0.0, 500.0, 7999.0, 8000.0, 20000.0];
        let bounded = [0.0, 0.001, 0.5, 0.999, 1.0];
        for &tempo in &tempos {
            for &centroid in &centroids {
                for &b in &bounded {
                    for position in 0..12 {
                        let raw = full_raw()
                            .with_tempo(tempo)
                            .with(Dimension::Key, f64::from(position))
                            .with(Dimension::Energy, b)
                            .with(Dimension::Valence, 1.0 - b)
                            .with(Dimension::SpectralCentroid, centroid)
                            .with(Dimension::DynamicRange, centroid / 100.0);
                        let vector = build_feature_vector(raw).unwrap();
                        for (dimension, value) in vector.iter() {
                            assert!(
                                (0.0..=1.0).contains(&value),
                                "{} = {} out of range",
                                dimension,
                                value
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_tempo_clamp_is_not_an_error() {
        let at_max = build_feature_vector(full_raw().with_tempo(200.0)).unwrap();
        let above = build_feature_vector(full_raw().with_tempo(250.0)).unwrap();
        assert_eq!(at_max.get(Dimension::Tempo), 1.0);
        assert_eq!(above, at_max);
    }

    #[test]
    fn test_missing_dimension() {
        let mut raw = full_raw();
        raw.valence = None;
        assert_eq!(
            build_feature_vector(raw),
            Err(ValidationError::MissingDimension(Dimension::Valence))
        );

        let err = build_feature_vector(RawDescriptors::new()).unwrap_err();
        assert_eq!(err, ValidationError::MissingDimension(Dimension::Tempo));
    }

    #[test]
    fn test_bounded_dimension_out_of_range() {
        let raw = full_raw().with(Dimension::Energy, 1.3);
        let err = build_feature_vector(raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                dimension: Dimension::Energy,
                value: 1.3
            }
        );
        assert_eq!(err.dimension(), Dimension::Energy);
        assert!(err.to_string().contains("energy"));
        assert!(err.to_string().contains("1.3"));
    }

    #[test]
    fn test_nan_rejected() {
        let raw = full_raw().with_tempo(f64::NAN);
        assert!(matches!(
            build_feature_vector(raw),
            Err(ValidationError::OutOfRange {
                dimension: Dimension::Tempo,
                ..
            })
        ));
    }

    #[test]
    fn test_try_from_array() {
        let mut values = [0.5; DIMENSION_COUNT];
        assert!(FeatureVector::try_from_array(values).is_ok());

        values[Dimension::Key.index()] = 1.0;
        assert!(FeatureVector::try_from_array(values).is_err());

        values[Dimension::Key.index()] = 0.5;
        values[Dimension::Valence.index()] = -0.1;
        assert_eq!(
            FeatureVector::try_from(values),
            Err(ValidationError::OutOfRange {
                dimension: Dimension::Valence,
                value: -0.1
            })
        );
    }

    #[test]
    fn test_json_preserves_precision_and_order() {
        let vector = build_feature_vector(full_raw().with_tempo(123.456_789_012_345)).unwrap();
        let json = vector.to_json().unwrap();
        assert!(json.contains("\"schema_version\":1"));

        let decoded = FeatureVector::from_json(&json).unwrap();
        for (a, b) in vector.as_array().iter().zip(decoded.as_array()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_json_rejects_bad_input() {
        let wrong_version = r#"{"schema_version":2,"values":[0,0,0,0,0,0,0,0,0,0,0,0]}"#;
        assert!(FeatureVector::from_json(wrong_version).is_err());

        let wrong_len = r#"{"schema_version":1,"values":[0,0,0]}"#;
        assert!(FeatureVector::from_json(wrong_len).is_err());

        let out_of_range = r#"{"schema_version":1,"values":[0,0,2,0,0,0,0,0,0,0,0,0]}"#;
        assert!(FeatureVector::from_json(out_of_range).is_err());
    }
}
