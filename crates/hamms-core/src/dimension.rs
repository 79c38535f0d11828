//! The twelve analysis dimensions and their per-dimension metadata.
//!
//! Dimension order is fixed: downstream consumers address vector components
//! by index as well as by name, so [`Dimension::ALL`] must never be reordered.
//! How a dimension is normalized and how distance along it is measured is
//! described by data in [`DIMENSION_SPECS`] rather than by branches in the
//! builder or the scoring loop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ValidationError};

/// Number of dimensions in every feature vector.
pub const DIMENSION_COUNT: usize = 12;

/// Number of positions on the Camelot key wheel.
pub const KEY_WHEEL_SIZE: u8 = 12;

/// Tempo domain in beats per minute; values outside are clamped.
pub const TEMPO_RANGE_BPM: (f64, f64) = (60.0, 200.0);

/// Spectral centroid reference range in Hz; values outside are clamped.
pub const SPECTRAL_CENTROID_RANGE_HZ: (f64, f64) = (0.0, 8000.0);

/// Dynamic range reference range in dB; values outside are clamped.
pub const DYNAMIC_RANGE_DB: (f64, f64) = (0.0, 30.0);

/// A named scalar axis of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[serde(alias = "bpm")]
    Tempo,
    Key,
    Energy,
    Danceability,
    Valence,
    Acousticness,
    Instrumentalness,
    RhythmicPattern,
    SpectralCentroid,
    TempoStability,
    HarmonicComplexity,
    DynamicRange,
}

impl Dimension {
    /// All dimensions in vector order.
    pub const ALL: [Self; DIMENSION_COUNT] = [
        Self::Tempo,
        Self::Key,
        Self::Energy,
        Self::Danceability,
        Self::Valence,
        Self::Acousticness,
        Self::Instrumentalness,
        Self::RhythmicPattern,
        Self::SpectralCentroid,
        Self::TempoStability,
        Self::HarmonicComplexity,
        Self::DynamicRange,
    ];

    /// Position of this dimension in a feature vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical snake_case name, as used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tempo => "tempo",
            Self::Key => "key",
            Self::Energy => "energy",
            Self::Danceability => "danceability",
            Self::Valence => "valence",
            Self::Acousticness => "acousticness",
            Self::Instrumentalness => "instrumentalness",
            Self::RhythmicPattern => "rhythmic_pattern",
            Self::SpectralCentroid => "spectral_centroid",
            Self::TempoStability => "tempo_stability",
            Self::HarmonicComplexity => "harmonic_complexity",
            Self::DynamicRange => "dynamic_range",
        }
    }

    /// Normalization and distance metadata for this dimension.
    pub fn spec(self) -> &'static DimensionSpec {
        &DIMENSION_SPECS[self.index()]
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    /// Parse a dimension name (case-insensitive). `bpm` is accepted as an
    /// alias for tempo.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("bpm") {
            return Ok(Self::Tempo);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownDimension(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// How a raw measurement is mapped onto [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Clamp into `[min, max]`, then scale linearly.
    ClampScale { min: f64, max: f64 },
    /// Already in [0, 1]; anything else is an upstream bug and is rejected.
    Bounded,
    /// A position on a circular wheel of the given size, mapped via
    /// `position / size`.
    Wheel(u8),
}

impl Normalization {
    /// Normalize a raw value for `dimension`.
    ///
    /// Non-finite input is rejected for every rule, since clamping cannot
    /// give NaN a meaning.
    pub fn apply(self, dimension: Dimension, raw: f64) -> Result<f64, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            dimension,
            value: raw,
        };

        if !raw.is_finite() {
            return Err(out_of_range());
        }

        match self {
            Self::ClampScale { min, max } => Ok((raw.clamp(min, max) - min) / (max - min)),
            Self::Bounded => {
                if (0.0..=1.0).contains(&raw) {
                    Ok(raw)
                } else {
                    Err(out_of_range())
                }
            }
            Self::Wheel(size) => {
                let size = f64::from(size);
                if raw >= 0.0 && raw < size {
                    Ok(raw / size)
                } else {
                    Err(out_of_range())
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Distance
// ---------------------------------------------------------------------------

/// How distance between two normalized values is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceKind {
    /// Absolute difference.
    Linear,
    /// Shorter arc on a wheel with the given number of positions, scaled so
    /// that half the wheel is a distance of 1.
    Circular(u8),
}

impl DistanceKind {
    /// Distance between two normalized values, in [0, 1].
    ///
    /// The result depends only on `|a - b|`, so it is bit-for-bit symmetric.
    pub fn distance(self, a: f64, b: f64) -> f64 {
        let diff = (a - b).abs();
        match self {
            Self::Linear => diff,
            Self::Circular(modulus) => {
                let modulus = f64::from(modulus);
                let steps = (diff * modulus) % modulus;
                let arc = steps.min(modulus - steps);
                (arc / (modulus / 2.0)).clamp(0.0, 1.0)
            }
        }
    }
}

/// Design-time metadata for one dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionSpec {
    pub dimension: Dimension,
    pub normalization: Normalization,
    pub distance: DistanceKind,
}

const fn linear(dimension: Dimension, normalization: Normalization) -> DimensionSpec {
    DimensionSpec {
        dimension,
        normalization,
        distance: DistanceKind::Linear,
    }
}

const fn clamp_scale(range: (f64, f64)) -> Normalization {
    Normalization::ClampScale {
        min: range.0,
        max: range.1,
    }
}

/// Metadata for every dimension, indexed like [`Dimension::ALL`].
pub static DIMENSION_SPECS: [DimensionSpec; DIMENSION_COUNT] = [
    linear(Dimension::Tempo, clamp_scale(TEMPO_RANGE_BPM)),
    DimensionSpec {
        dimension: Dimension::Key,
        normalization: Normalization::Wheel(KEY_WHEEL_SIZE),
        distance: DistanceKind::Circular(KEY_WHEEL_SIZE),
    },
    linear(Dimension::Energy, Normalization::Bounded),
    linear(Dimension::Danceability, Normalization::Bounded),
    linear(Dimension::Valence, Normalization::Bounded),
    linear(Dimension::Acousticness, Normalization::Bounded),
    linear(Dimension::Instrumentalness, Normalization::Bounded),
    linear(Dimension::RhythmicPattern, Normalization::Bounded),
    linear(Dimension::SpectralCentroid, clamp_scale(SPECTRAL_CENTROID_RANGE_HZ)),
    linear(Dimension::TempoStability, Normalization::Bounded),
    linear(Dimension::HarmonicComplexity, Normalization::Bounded),
    linear(Dimension::DynamicRange, clamp_scale(DYNAMIC_RANGE_DB)),
];
