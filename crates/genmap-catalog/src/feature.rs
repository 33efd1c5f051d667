//! Feature space used for similarity search
//!
//! Every response function projects to a fixed-length vector built from its
//! native parameters on a log scale. All distances in the system go through
//! [`euclidean`], so a score computed by the index and a score recomputed by
//! the assigner are bit-identical.

use crate::error::{CatalogError, Result};
use crate::response::ResponseFunction;
use serde::{Deserialize, Serialize};

/// Number of coordinates in a feature vector
pub const FEATURE_DIM: usize = 4;

/// Weighted coordinates of a response curve
pub type FeatureVector = [f64; FEATURE_DIM];

/// Euclidean distance between two feature vectors
pub fn euclidean(a: &FeatureVector, b: &FeatureVector) -> f64 {
    let mut sum = 0.0;
    for i in 0..FEATURE_DIM {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum.sqrt()
}

/// The curve an ideal part would have at some circuit position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseTarget {
    /// Desired logical-0 output level
    pub low: f64,
    /// Desired logical-1 output level
    pub high: f64,
    /// Desired switching threshold
    pub threshold: f64,
    /// Desired Hill coefficient
    pub steepness: f64,
}

/// Weighted log-parameter space
///
/// Coordinates are `[log10(ymin/decay), log10(ymax/decay), log10(K), n]`,
/// multiplied per axis by `weights`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpace {
    pub weights: [f64; FEATURE_DIM],
}

impl Default for FeatureSpace {
    fn default() -> Self {
        Self {
            weights: [1.0, 1.0, 1.0, 0.25],
        }
    }
}

impl FeatureSpace {
    /// Create a feature space with custom axis weights
    pub fn new(weights: [f64; FEATURE_DIM]) -> Result<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(CatalogError::InvalidWeights(format!(
                "weights must be positive and finite, got {:?}",
                weights
            )));
        }
        Ok(Self { weights })
    }

    fn weigh(&self, raw: FeatureVector) -> FeatureVector {
        let mut out = raw;
        for (v, w) in out.iter_mut().zip(self.weights.iter()) {
            *v *= w;
        }
        out
    }

    /// Project a response function
    pub fn feature_vector(&self, response: &ResponseFunction) -> FeatureVector {
        let p = &response.params;
        self.weigh([
            (p.ymin / p.decay).log10(),
            (p.ymax / p.decay).log10(),
            p.k.log10(),
            p.n,
        ])
    }

    /// Project a target curve
    pub fn project(&self, target: &ResponseTarget) -> FeatureVector {
        self.weigh([
            target.low.log10(),
            target.high.log10(),
            target.threshold.log10(),
            target.steepness,
        ])
    }

    /// Distance between a response function and a target
    pub fn distance(&self, response: &ResponseFunction, target: &ResponseTarget) -> f64 {
        euclidean(&self.feature_vector(response), &self.project(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euclidean_metric() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [3.0, 4.0, 0.0, 0.0];
        let c = [1.0, -2.0, 0.5, 2.0];
        assert_eq!(euclidean(&a, &b), 5.0);
        assert_eq!(euclidean(&a, &b), euclidean(&b, &a));
        assert_eq!(euclidean(&c, &c), 0.0);
        assert!(euclidean(&a, &c) <= euclidean(&a, &b) + euclidean(&b, &c));
    }

    #[test]
    fn test_feature_vector_is_deterministic() {
        let space = FeatureSpace::default();
        let rf = ResponseFunction::repressor(0.02, 6.8, 0.13, 3.9);
        let first = space.feature_vector(&rf);
        for _ in 0..10 {
            assert_eq!(space.feature_vector(&rf), first);
        }
        assert_eq!(first[3], 3.9 * 0.25);
    }

    #[test]
    fn test_target_matching_part_has_zero_distance() {
        let space = FeatureSpace::default();
        let rf = ResponseFunction::repressor(0.01, 10.0, 0.5, 2.0);
        let target = ResponseTarget {
            low: 0.01,
            high: 10.0,
            threshold: 0.5,
            steepness: 2.0,
        };
        assert_eq!(space.distance(&rf, &target), 0.0);
    }

    #[test]
    fn test_invalid_weights() {
        assert!(FeatureSpace::new([1.0, 0.0, 1.0, 1.0]).is_err());
        assert!(FeatureSpace::new([1.0, 1.0, f64::INFINITY, 1.0]).is_err());
        assert!(FeatureSpace::new([2.0, 1.0, 1.0, 1.0]).is_ok());
    }
}
