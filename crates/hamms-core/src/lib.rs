//! Core model for hamms.
//!
//! This crate defines the twelve analysis dimensions, the raw descriptor
//! input handed over by an audio analyzer, the Camelot key wheel, the
//! normalized and immutable [`FeatureVector`], and the weight profiles used
//! to score vectors against each other.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod descriptors;
pub mod dimension;
pub mod error;
pub mod key;
pub mod lenient;
pub mod vector;
pub mod weights;

pub use descriptors::RawDescriptors;
pub use dimension::{Dimension, DimensionSpec, DistanceKind, Normalization, DIMENSION_COUNT};
pub use error::{Error, Result, ValidationError};
pub use key::{CamelotKey, Mode, RawKey};
pub use vector::{build_feature_vector, FeatureVector, SCHEMA_VERSION};
pub use weights::WeightProfile;
