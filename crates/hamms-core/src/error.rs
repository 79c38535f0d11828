use thiserror::Error;

use crate::dimension::Dimension;

/// Errors raised while turning raw descriptors into a [`FeatureVector`].
///
/// Neither variant is retryable: the upstream analyzer has to re-supply
/// corrected input.
///
/// [`FeatureVector`]: crate::vector::FeatureVector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required raw field was absent.
    #[error("missing dimension: {0}")]
    MissingDimension(Dimension),

    /// A value fell outside the range its dimension accepts.
    #[error("value {value} out of range for dimension {dimension}")]
    OutOfRange { dimension: Dimension, value: f64 },
}

impl ValidationError {
    /// The dimension the error refers to.
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::MissingDimension(dimension) | Self::OutOfRange { dimension, .. } => *dimension,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid weight {weight} for dimension {dimension}: weights must be positive and finite")]
    InvalidWeight { dimension: Dimension, weight: f64 },

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("invalid key notation: {0}")]
    InvalidKey(String),

    #[error("unsupported feature vector schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
