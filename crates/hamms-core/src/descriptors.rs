//! Raw per-track measurements, as handed over by the audio analyzer.

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::ValidationError;
use crate::key::RawKey;

/// Unvalidated per-track measurements from the audio analyzer.
///
/// Every field is optional so that a partial analysis can be represented
/// and reported precisely: a missing field surfaces as
/// [`ValidationError::MissingDimension`] when the vector is built.
///
/// Tempo, spectral centroid and dynamic range are in physical units and are
/// clamped during normalization. The remaining scalar fields must already
/// lie in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDescriptors {
    /// Tempo in beats per minute.
    #[serde(alias = "bpm")]
    pub tempo_bpm: Option<f64>,
    pub key: Option<RawKey>,
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
    pub rhythmic_pattern: Option<f64>,
    /// Spectral centroid in Hz.
    pub spectral_centroid_hz: Option<f64>,
    pub tempo_stability: Option<f64>,
    pub harmonic_complexity: Option<f64>,
    /// Dynamic range in dB.
    pub dynamic_range_db: Option<f64>,
}

impl RawDescriptors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tempo(mut self, bpm: f64) -> Self {
        self.tempo_bpm = Some(bpm);
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<RawKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set any scalar dimension by name. Setting [`Dimension::Key`] this way
    /// records `value` as a zero-based wheel position, checked when the
    /// vector is built.
    #[must_use]
    pub fn with(mut self, dimension: Dimension, value: f64) -> Self {
        match self.scalar_slot(dimension) {
            Some(slot) => *slot = Some(value),
            None => self.key = Some(RawKey::Position(value)),
        }
        self
    }

    /// The raw measurement for `dimension`, ready for normalization.
    ///
    /// For the key this is the zero-based wheel position.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingDimension`] if the field is absent,
    /// or [`ValidationError::OutOfRange`] for an invalid key.
    pub fn measurement(&self, dimension: Dimension) -> Result<f64, ValidationError> {
        let missing = || ValidationError::MissingDimension(dimension);
        match dimension {
            Dimension::Key => {
                let key = self.key.ok_or_else(missing)?;
                key.wheel_position().map(f64::from)
            }
            Dimension::Tempo => self.tempo_bpm.ok_or_else(missing),
            Dimension::Energy => self.energy.ok_or_else(missing),
            Dimension::Danceability => self.danceability.ok_or_else(missing),
            Dimension::Valence => self.valence.ok_or_else(missing),
            Dimension::Acousticness => self.acousticness.ok_or_else(missing),
            Dimension::Instrumentalness => self.instrumentalness.ok_or_else(missing),
            Dimension::RhythmicPattern => self.rhythmic_pattern.ok_or_else(missing),
            Dimension::SpectralCentroid => self.spectral_centroid_hz.ok_or_else(missing),
            Dimension::TempoStability => self.tempo_stability.ok_or_else(missing),
            Dimension::HarmonicComplexity => self.harmonic_complexity.ok_or_else(missing),
            Dimension::DynamicRange => self.dynamic_range_db.ok_or_else(missing),
        }
    }

    /// Dimensions with no value supplied, in vector order.
    pub fn missing_dimensions(&self) -> Vec<Dimension> {
        Dimension::ALL
            .iter()
            .copied()
            .filter(|&d| {
                matches!(
                    self.measurement(d),
                    Err(ValidationError::MissingDimension(_))
                )
            })
            .collect()
    }

    fn scalar_slot(&mut self, dimension: Dimension) -> Option<&mut Option<f64>> {
        let slot = match dimension {
            Dimension::Key => return None,
            Dimension::Tempo => &mut self.tempo_bpm,
            Dimension::Energy => &mut self.energy,
            Dimension::Danceability => &mut self.danceability,
            Dimension::Valence => &mut self.valence,
            Dimension::Acousticness => &mut self.acousticness,
            Dimension::Instrumentalness => &mut self.instrumentalness,
            Dimension::RhythmicPattern => &mut self.rhythmic_pattern,
            Dimension::SpectralCentroid => &mut self.spectral_centroid_hz,
            Dimension::TempoStability => &mut self.tempo_stability,
            Dimension::HarmonicComplexity => &mut self.harmonic_complexity,
            Dimension::DynamicRange => &mut self.dynamic_range_db,
        };
        Some(slot)
    }
}
