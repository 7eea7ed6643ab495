//! Sparse vectors and distance kernels for the forest.
//!
//! Trigram vectors are mostly zeros (a paragraph touches a few hundred of
//! the 19,683 dimensions), so items and split normals are stored as sorted
//! `(index, value)` lists.

use serde::{Deserialize, Serialize};

use crate::vectorize::FeatureVector;

/// Sorted sparse vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    pub(crate) fn from_feature(vector: &FeatureVector) -> Self {
        let (indices, values) = vector
            .nonzero()
            .map(|(i, c)| (i as u32, f32::from(c)))
            .unzip();
        Self { indices, values }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub(crate) fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub(crate) fn norm_sq(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub(crate) fn scaled(&self, factor: f32) -> SparseVector {
        SparseVector {
            indices: self.indices.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// `self - other`, dropping dimensions that cancel exactly
    pub(crate) fn sub(&self, other: &SparseVector) -> SparseVector {
        let mut out = SparseVector::default();
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() || j < other.indices.len() {
            let (index, value) = match (self.indices.get(i), other.indices.get(j)) {
                (Some(&a), Some(&b)) if a == b => {
                    let v = self.values[i] - other.values[j];
                    i += 1;
                    j += 1;
                    (a, v)
                }
                (Some(&a), Some(&b)) if a < b => {
                    i += 1;
                    (a, self.values[i - 1])
                }
                (Some(&a), None) => {
                    i += 1;
                    (a, self.values[i - 1])
                }
                (_, Some(&b)) => {
                    j += 1;
                    (b, -other.values[j - 1])
                }
                (None, None) => break,
            };
            if value != 0.0 {
                out.indices.push(index);
                out.values.push(value);
            }
        }
        out
    }
}

/// Distance used to rank candidates and orient split planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// `2 - 2 cos(a, b)`; a zero vector is at distance 2 from everything
    #[default]
    Angular,
    /// Squared euclidean distance
    Euclidean,
}

impl Metric {
    pub(crate) fn distance(&self, a: &SparseVector, b: &SparseVector) -> f32 {
        let pp = a.norm_sq();
        let qq = b.norm_sq();
        let pq = a.dot(b);
        match self {
            Metric::Angular => {
                let ppqq = pp * qq;
                if ppqq > 0.0 {
                    (2.0 - 2.0 * pq / ppqq.sqrt()).max(0.0)
                } else {
                    2.0
                }
            }
            Metric::Euclidean => (pp + qq - 2.0 * pq).max(0.0),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = crate::error::ReuseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "angular" => Ok(Metric::Angular),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(crate::error::ReuseError::invalid_value(
                "metric (expected angular or euclidean)",
                other,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(pairs: &[(u32, f32)]) -> SparseVector {
        SparseVector {
            indices: pairs.iter().map(|p| p.0).collect(),
            values: pairs.iter().map(|p| p.1).collect(),
        }
    }

    #[test]
    fn test_dot_and_norm() {
        let a = sparse(&[(1, 2.0), (4, 3.0)]);
        let b = sparse(&[(0, 5.0), (4, 2.0), (9, 1.0)]);
        assert_eq!(a.dot(&b), 6.0);
        assert_eq!(a.norm_sq(), 13.0);
    }

    #[test]
    fn test_sub_merges_and_cancels() {
        let a = sparse(&[(1, 2.0), (4, 3.0)]);
        let b = sparse(&[(0, 5.0), (4, 3.0), (9, 1.0)]);
        assert_eq!(a.sub(&b), sparse(&[(0, -5.0), (1, 2.0), (9, -1.0)]));
        assert!(a.sub(&a).is_zero());
    }

    #[test]
    fn test_angular_distance() {
        let a = sparse(&[(0, 1.0)]);
        let b = sparse(&[(0, 3.0)]);
        let c = sparse(&[(1, 1.0)]);
        assert!(Metric::Angular.distance(&a, &b).abs() < 1e-6);
        assert!((Metric::Angular.distance(&a, &c) - 2.0).abs() < 1e-6);
        assert_eq!(Metric::Angular.distance(&a, &SparseVector::default()), 2.0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = sparse(&[(0, 1.0), (2, 2.0)]);
        let b = sparse(&[(0, 4.0)]);
        // (1-4)^2 + 2^2
        assert_eq!(Metric::Euclidean.distance(&a, &b), 13.0);
    }

    #[test]
    fn test_from_feature_keeps_nonzero() {
        let fv = FeatureVector::from_counts(vec![0, 3, 0, 0, 1]);
        assert_eq!(SparseVector::from_feature(&fv), sparse(&[(1, 3.0), (4, 1.0)]));
    }
}
