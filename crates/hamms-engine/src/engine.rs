//! Weighted distance scoring and ranking.
//!
//! For each dimension the engine takes the distance its [`DistanceKind`]
//! prescribes (circular for the key, linear otherwise), then combines them:
//!
//! ```text
//! D = sqrt(sum(w_i * d_i^2)) / sqrt(sum(w_i))
//! S = clamp(1 - D, 0, 1)
//! ```
//!
//! Every `d_i` depends only on `|a_i - b_i|` and the terms are summed in
//! fixed dimension order, so `score(a, b)` and `score(b, a)` are equal bit
//! for bit.
//!
//! [`DistanceKind`]: hamms_core::DistanceKind

use hamms_core::dimension::DIMENSION_SPECS;
use hamms_core::lenient;
use hamms_core::{FeatureVector, Result, WeightProfile};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::score::{Breakdown, CompatibilityScore, Contribution};

/// Optional cut-offs applied after ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Keep at most this many results.
    #[serde(deserialize_with = "lenient::deserialize_option")]
    pub top_k: Option<usize>,
    /// Drop results scoring below this value.
    #[serde(deserialize_with = "lenient::deserialize_option")]
    pub min_score: Option<f64>,
}

/// Scores pairs of feature vectors under a fixed weight profile.
///
/// The engine holds no vectors; it borrows what it scores. The weight
/// profile is fixed for the engine's lifetime, so engines with different
/// profiles can be used side by side.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    weights: WeightProfile,
    total_weight: f64,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        let weights = WeightProfile::default();
        let total_weight = weights.total();
        Self {
            weights,
            total_weight,
        }
    }
}

impl SimilarityEngine {
    /// Create an engine with the given weights.
    ///
    /// # Errors
    ///
    /// Returns [`hamms_core::Error::InvalidWeight`] if any weight is not
    /// positive and finite, or [`hamms_core::Error::InvalidData`] if the
    /// weights sum past `f64::MAX`.
    pub fn new(weights: WeightProfile) -> Result<Self> {
        weights.validate()?;
        let total_weight = weights.total();
        log::debug!("Similarity engine created, total weight {:.3}", total_weight);
        Ok(Self {
            weights,
            total_weight,
        })
    }

    pub fn weights(&self) -> &WeightProfile {
        &self.weights
    }

    /// Compatibility of two tracks.
    pub fn score(&self, a: &FeatureVector, b: &FeatureVector) -> CompatibilityScore {
        CompatibilityScore::new(self.evaluate(a, b, |_| {}))
    }

    /// Like [`SimilarityEngine::score`], with the per-dimension breakdown
    /// attached. The value is identical to `score(a, b)`.
    pub fn explain(&self, a: &FeatureVector, b: &FeatureVector) -> CompatibilityScore {
        let mut contributions = Vec::with_capacity(DIMENSION_SPECS.len());
        let value = self.evaluate(a, b, |c| contributions.push(c));
        CompatibilityScore::with_breakdown(value, Breakdown::new(contributions))
    }

    /// Score every candidate against `query` and sort by descending score.
    ///
    /// Ties keep ascending candidate index, so the order is reproducible
    /// regardless of how the scoring work was split across threads.
    pub fn rank(
        &self,
        query: &FeatureVector,
        candidates: &[FeatureVector],
    ) -> Vec<(usize, CompatibilityScore)> {
        let mut ranked: Vec<(usize, CompatibilityScore)> = candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| (index, self.score(query, candidate)))
            .collect();

        ranked.sort_by(|(ia, a), (ib, b)| b.cmp_value(a).then(ia.cmp(ib)));

        log::debug!("Ranked {} candidates", ranked.len());
        ranked
    }

    /// [`SimilarityEngine::rank`] followed by the cut-offs in `options`.
    pub fn rank_with(
        &self,
        query: &FeatureVector,
        candidates: &[FeatureVector],
        options: &RankOptions,
    ) -> Vec<(usize, CompatibilityScore)> {
        let mut ranked = self.rank(query, candidates);
        if let Some(min_score) = options.min_score {
            // Sorted descending, so everything below the cut-off is a suffix.
            let keep = ranked.partition_point(|(_, s)| s.value() >= min_score);
            ranked.truncate(keep);
        }
        if let Some(top_k) = options.top_k {
            ranked.truncate(top_k);
        }
        ranked
    }

    /// The `k` most compatible candidates.
    pub fn rank_top(
        &self,
        query: &FeatureVector,
        candidates: &[FeatureVector],
        k: usize,
    ) -> Vec<(usize, CompatibilityScore)> {
        let options = RankOptions {
            top_k: Some(k),
            min_score: None,
        };
        self.rank_with(query, candidates, &options)
    }

    /// Candidates scoring at least `threshold`.
    pub fn rank_above(
        &self,
        query: &FeatureVector,
        candidates: &[FeatureVector],
        threshold: f64,
    ) -> Vec<(usize, CompatibilityScore)> {
        let options = RankOptions {
            top_k: None,
            min_score: Some(threshold),
        };
        self.rank_with(query, candidates, &options)
    }

    fn evaluate(
        &self,
        a: &FeatureVector,
        b: &FeatureVector,
        mut on_term: impl FnMut(Contribution),
    ) -> f64 {
        let mut sum = 0.0;
        for spec in &DIMENSION_SPECS {
            let dimension = spec.dimension;
            let distance = spec.distance.distance(a.get(dimension), b.get(dimension));
            let weight = self.weights.get(dimension);
            let term = weight * distance * distance;
            sum += term;
            on_term(Contribution {
                dimension,
                distance,
                weight,
                weighted_share: term / self.total_weight,
            });
        }

        // Rounding can push D a hair past 1; clamp rather than fail.
        let distance = sum.sqrt() / self.total_weight.sqrt();
        (1.0 - distance).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamms_core::{Dimension, DIMENSION_COUNT};

    fn vector(values: [f64; DIMENSION_COUNT]) -> FeatureVector {
        FeatureVector::try_from_array(values).unwrap()
    }

    fn with_key(position: u8) -> FeatureVector {
        let mut values = [0.5; DIMENSION_COUNT];
        values[Dimension::Key.index()] = f64::from(position) / 12.0;
        vector(values)
    }

    #[test]
    fn test_identity_scores_one() {
        let engine = SimilarityEngine::default();
        for values in [[0.0; DIMENSION_COUNT], [0.5; DIMENSION_COUNT], [0.9; DIMENSION_COUNT]] {
            let mut values = values;
            values[Dimension::Key.index()] = 0.25;
            let v = vector(values);
            assert_eq!(engine.score(&v, &v).value(), 1.0);
        }
    }

    #[test]
    fn test_symmetry_is_exact() {
        let engine = SimilarityEngine::new(
            WeightProfile::default().with(Dimension::Valence, 3.7),
        )
        .unwrap();
        let samples = [0.0, 0.1, 1.0 / 3.0, 0.5, 0.7, 11.0 / 12.0];
        let vectors: Vec<FeatureVector> = samples
            .iter()
            .map(|&s| {
                let mut values = [0.0; DIMENSION_COUNT];
                for (i, v) in values.iter_mut().enumerate() {
                    *v = (s + i as f64 * 0.073) % 1.0;
                }
                vector(values)
            })
            .collect();

        for a in &vectors {
            for b in &vectors {
                let ab = engine.score(a, b).value();
                let ba = engine.score(b, a).value();
                assert_eq!(ab.to_bits(), ba.to_bits());
            }
        }
    }

    #[test]
    fn test_maximal_distance_scores_zero() {
        let engine = SimilarityEngine::new(WeightProfile::uniform()).unwrap();
        let mut low = [0.0; DIMENSION_COUNT];
        let mut high = [1.0; DIMENSION_COUNT];
        low[Dimension::Key.index()] = 0.0;
        high[Dimension::Key.index()] = 0.5;
        let score = engine.score(&vector(low), &vector(high)).value();
        assert!(score.abs() < 1e-12);
        assert!(score >= 0.0);
    }

    #[test]
    fn test_key_distance_wraps_around_wheel() {
        let engine = SimilarityEngine::default();
        let origin = with_key(0);
        let adjacent = engine.score(&origin, &with_key(11)).value();
        let one_step = engine.score(&origin, &with_key(1)).value();
        let opposite = engine.score(&origin, &with_key(6)).value();

        assert!((adjacent - one_step).abs() < 1e-12);
        assert!(opposite < one_step);
        assert!(adjacent > 0.9);
    }

    #[test]
    fn test_explain_matches_score() {
        let engine = SimilarityEngine::default();
        let a = with_key(2);
        let mut values = [0.5; DIMENSION_COUNT];
        values[Dimension::Energy.index()] = 0.9;
        values[Dimension::Key.index()] = 5.0 / 12.0;
        let b = vector(values);

        let plain = engine.score(&a, &b);
        let explained = engine.explain(&a, &b);
        assert_eq!(plain.value().to_bits(), explained.value().to_bits());
        assert!(plain.breakdown().is_none());

        let breakdown = explained.breakdown().unwrap();
        assert_eq!(breakdown.contributions().len(), DIMENSION_COUNT);
        assert_eq!(breakdown.get(Dimension::Tempo).unwrap().distance, 0.0);
        assert!((breakdown.get(Dimension::Key).unwrap().distance - 0.5).abs() < 1e-12);
        assert_eq!(breakdown.dominant().unwrap().dimension, Dimension::Key);

        let share_sum: f64 = breakdown.contributions().iter().map(|c| c.weighted_share).sum();
        let distance = 1.0 - explained.value();
        assert!((share_sum - distance * distance).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let weights = WeightProfile::default().with(Dimension::Key, 0.0);
        assert!(SimilarityEngine::new(weights).is_err());
    }

    #[test]
    fn test_overflowing_weight_total_rejected() {
        let huge = WeightProfile::uniform()
            .with(Dimension::Energy, f64::MAX)
            .with(Dimension::Tempo, f64::MAX);
        assert!(SimilarityEngine::new(huge).is_err());

        // Large but summable weights still discriminate.
        let engine = SimilarityEngine::new(WeightProfile::uniform().with(Dimension::Energy, 1e300))
            .unwrap();
        let a = with_key(0);
        let mut values = [0.5; DIMENSION_COUNT];
        values[Dimension::Key.index()] = 0.0;
        values[Dimension::Energy.index()] = 0.9;
        let b = vector(values);
        assert_eq!(engine.score(&a, &a).value(), 1.0);
        assert!(engine.score(&a, &b).value() < 1.0);
    }

    #[test]
    fn test_weights_change_scores() {
        let a = with_key(0);
        let b = with_key(3);
        let key_heavy =
            SimilarityEngine::new(WeightProfile::uniform().with(Dimension::Key, 10.0)).unwrap();
        let key_light =
            SimilarityEngine::new(WeightProfile::uniform().with(Dimension::Key, 0.1)).unwrap();
        assert!(key_heavy.score(&a, &b).value() < key_light.score(&a, &b).value());
    }

    #[test]
    fn test_rank_orders_by_score_then_index() {
        let engine = SimilarityEngine::default();
        let query = with_key(0);
        let candidates = vec![with_key(6), with_key(2), with_key(0), with_key(3), with_key(0)];

        let ranked = engine.rank(&query, &candidates);
        let order: Vec<usize> = ranked.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![2, 4, 1, 3, 0]);
        for pair in ranked.windows(2) {
            assert!(pair[0].1.value() >= pair[1].1.value());
        }
    }

    #[test]
    fn test_rank_is_deterministic() {
        let engine = SimilarityEngine::default();
        let query = with_key(4);
        let candidates: Vec<FeatureVector> = (0u8..200).map(|i| with_key(i % 12)).collect();

        let first = engine.rank(&query, &candidates);
        for _ in 0..5 {
            assert_eq!(engine.rank(&query, &candidates), first);
        }
    }

    #[test]
    fn test_rank_with_cutoffs() {
        let engine = SimilarityEngine::default();
        let query = with_key(0);
        let candidates = vec![with_key(6), with_key(1), with_key(0), with_key(3)];

        let top = engine.rank_top(&query, &candidates, 2);
        assert_eq!(top.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![2, 1]);

        let above = engine.rank_above(&query, &candidates, 1.0);
        assert_eq!(above.len(), 1);
        assert_eq!(above[0].0, 2);

        let options = RankOptions {
            top_k: Some(10),
            min_score: Some(0.0),
        };
        assert_eq!(engine.rank_with(&query, &candidates, &options).len(), 4);

        assert!(engine.rank(&query, &[]).is_empty());
        assert!(engine.rank_top(&query, &candidates, 0).is_empty());
    }
}
