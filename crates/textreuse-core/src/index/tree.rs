//! Random projection tree construction.
//!
//! Each tree splits its item set with a hyperplane through two sampled
//! items until a node holds at most `leaf_size` items. A split that puts
//! more than 95% of the items on one side is retried with fresh samples; after a few failures the
//! items are divided at random under a zero normal, which queries treat as
//! "search both sides".

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::sparse::{Metric, SparseVector};

const SPLIT_ATTEMPTS: usize = 3;

/// Largest share of a node's items one side of a split may take
const MAX_SPLIT_SHARE: f64 = 0.95;

/// Whether a split is even enough to keep tree depth logarithmic
pub(crate) fn is_balanced(left: usize, right: usize) -> bool {
    if left == 0 || right == 0 {
        return false;
    }
    left.max(right) as f64 / (left + right) as f64 <= MAX_SPLIT_SHARE
}

/// Forest node. Children are indices into the shared node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Node {
    Leaf {
        items: Vec<u32>,
    },
    Split {
        normal: SparseVector,
        offset: f32,
        left: u32,
        right: u32,
    },
}

/// Signed distance-like margin of `vector` from a split plane
pub(crate) fn margin(normal: &SparseVector, offset: f32, vector: &SparseVector) -> f32 {
    normal.dot(vector) + offset
}

pub(crate) struct TreeBuilder<'a> {
    pub(crate) items: &'a [SparseVector],
    pub(crate) metric: Metric,
    pub(crate) leaf_size: usize,
    pub(crate) nodes: &'a mut Vec<Node>,
    pub(crate) rng: &'a mut StdRng,
}

impl TreeBuilder<'_> {
    /// Build a subtree over `ids`, returning its root node index.
    pub(crate) fn build(&mut self, ids: Vec<u32>) -> u32 {
        if ids.len() <= self.leaf_size {
            return self.push(Node::Leaf { items: ids });
        }

        for _ in 0..SPLIT_ATTEMPTS {
            let Some((normal, offset)) = self.sample_plane(&ids) else {
                continue;
            };
            let (left, right) = self.partition(&ids, &normal, offset);
            if is_balanced(left.len(), right.len()) {
                return self.push_split(normal, offset, left, right);
            }
        }

        let (left, right) = self.random_partition(ids);
        self.push_split(SparseVector::default(), 0.0, left, right)
    }

    fn push(&mut self, node: Node) -> u32 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    fn push_split(
        &mut self,
        normal: SparseVector,
        offset: f32,
        left: Vec<u32>,
        right: Vec<u32>,
    ) -> u32 {
        let left = self.build(left);
        let right = self.build(right);
        self.push(Node::Split {
            normal,
            offset,
            left,
            right,
        })
    }

    /// Hyperplane equidistant from two random items, or `None` if they coincide
    fn sample_plane(&mut self, ids: &[u32]) -> Option<(SparseVector, f32)> {
        let a = self.rng.gen_range(0..ids.len());
        let mut b = self.rng.gen_range(0..ids.len() - 1);
        if b >= a {
            b += 1;
        }
        let p = &self.items[ids[a] as usize];
        let q = &self.items[ids[b] as usize];

        let (normal, offset) = match self.metric {
            Metric::Angular => (normalized(p).sub(&normalized(q)), 0.0),
            Metric::Euclidean => {
                let normal = p.sub(q);
                let offset = -(p.norm_sq() - q.norm_sq()) / 2.0;
                (normal, offset)
            }
        };

        if normal.is_zero() {
            None
        } else {
            Some((normal, offset))
        }
    }

    fn partition(
        &mut self,
        ids: &[u32],
        normal: &SparseVector,
        offset: f32,
    ) -> (Vec<u32>, Vec<u32>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &id in ids {
            let m = margin(normal, offset, &self.items[id as usize]);
            let go_right = if m == 0.0 { self.rng.gen() } else { m > 0.0 };
            if go_right {
                right.push(id);
            } else {
                left.push(id);
            }
        }
        (left, right)
    }

    fn random_partition(&mut self, mut ids: Vec<u32>) -> (Vec<u32>, Vec<u32>) {
        ids.shuffle(&mut *self.rng);
        let right = ids.split_off(ids.len() / 2);
        (ids, right)
    }
}

fn normalized(v: &SparseVector) -> SparseVector {
    let norm = v.norm_sq().sqrt();
    if norm > 0.0 {
        v.scaled(1.0 / norm)
    } else {
        v.clone()
    }
}
