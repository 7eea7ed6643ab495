//! Approximate nearest-neighbor index over trigram vectors.
//!
//! An Annoy-style forest of random projection trees. Items are inserted at
//! dense positions, the forest is built once, and queries walk every tree
//! best-first by hyperplane margin until `search_k` candidates are
//! collected. Candidates are then ranked by exact distance.
//!
//! ```text
//! add_item(0..n) ──▶ build(n_trees, seed) ──▶ get_nns_by_item(pos, k, search_k)
//!                            │
//!                            └──▶ persist::save / persist::load
//! ```

pub mod persist;
mod sparse;
mod tree;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub use sparse::Metric;

use crate::config::IndexConfig;
use crate::error::{ReuseError, Result};
use crate::label::{Label, LabelTable};
use crate::trace_time;
use crate::vectorize::FeatureVector;
use sparse::SparseVector;
use tree::{margin, Node, TreeBuilder};

/// Forest construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexParams {
    pub trees: usize,
    pub metric: Metric,
    pub seed: u64,
    pub leaf_size: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self::from(&IndexConfig::default())
    }
}

impl From<&IndexConfig> for IndexParams {
    fn from(config: &IndexConfig) -> Self {
        Self {
            trees: config.trees,
            metric: config.metric,
            seed: config.seed,
            leaf_size: config.leaf_size,
        }
    }
}

/// Random projection forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnIndex {
    dimension: usize,
    metric: Metric,
    items: Vec<SparseVector>,
    nodes: Vec<Node>,
    roots: Vec<u32>,
    built: bool,
}

/// Frontier entry during a query; larger priority is explored first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    priority: f32,
    node: u32,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AnnIndex {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize, metric: Metric) -> Result<Self> {
        if dimension == 0 {
            return Err(ReuseError::InvalidConfig(
                "index dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            metric,
            items: Vec::new(),
            nodes: Vec::new(),
            roots: Vec::new(),
            built: false,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn n_trees(&self) -> usize {
        self.roots.len()
    }

    /// Insert a vector at `position`, which must be the next free position.
    pub fn add_item(&mut self, position: usize, vector: &FeatureVector) -> Result<()> {
        if self.built {
            return Err(ReuseError::failed(
                "add item",
                "index is already built",
            ));
        }
        if vector.len() != self.dimension {
            return Err(ReuseError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if position != self.items.len() {
            return Err(ReuseError::invalid_value(
                "item position (positions must be dense)",
                format!("{} (next free is {})", position, self.items.len()),
            ));
        }
        self.items.push(SparseVector::from_feature(vector));
        Ok(())
    }

    /// Build `n_trees` random projection trees.
    pub fn build(&mut self, n_trees: usize, seed: u64, leaf_size: usize) -> Result<()> {
        if n_trees == 0 {
            return Err(ReuseError::InvalidConfig(
                "number of trees must be >= 1".to_string(),
            ));
        }
        if leaf_size < 2 {
            return Err(ReuseError::InvalidConfig(
                "leaf size must be >= 2".to_string(),
            ));
        }
        if self.built {
            return Ok(());
        }

        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(seed);
        let all: Vec<u32> = (0..self.items.len() as u32).collect();

        for _ in 0..n_trees {
            let mut builder = TreeBuilder {
                items: &self.items,
                metric: self.metric,
                leaf_size,
                nodes: &mut self.nodes,
                rng: &mut rng,
            };
            let root = builder.build(all.clone());
            self.roots.push(root);
        }

        self.built = true;
        trace_time!(
            start,
            "build_forest",
            trees = n_trees,
            items = self.items.len(),
            nodes = self.nodes.len()
        );
        Ok(())
    }

    /// Up to `k` approximate nearest neighbors of the item at `position`,
    /// nearest first. The item itself is normally among them, ranked after
    /// any other item at the same distance.
    ///
    /// `search_k` bounds how many candidates are collected from the trees
    /// before exact ranking; it defaults to `k * n_trees`.
    pub fn get_nns_by_item(
        &self,
        position: usize,
        k: usize,
        search_k: Option<usize>,
    ) -> Result<Vec<usize>> {
        let query = self
            .items
            .get(position)
            .ok_or(ReuseError::InvalidLabel { position })?;
        Ok(self.search(query, Some(position as u32), k, search_k))
    }

    /// Exact distance between two indexed items
    pub fn distance(&self, a: usize, b: usize) -> Result<f32> {
        let va = self
            .items
            .get(a)
            .ok_or(ReuseError::InvalidLabel { position: a })?;
        let vb = self
            .items
            .get(b)
            .ok_or(ReuseError::InvalidLabel { position: b })?;
        Ok(self.metric.distance(va, vb))
    }

    fn search(
        &self,
        query: &SparseVector,
        query_id: Option<u32>,
        k: usize,
        search_k: Option<usize>,
    ) -> Vec<usize> {
        if k == 0 || !self.built || self.items.is_empty() {
            return Vec::new();
        }
        let search_k = search_k.unwrap_or(k * self.roots.len()).max(k);

        let mut frontier: BinaryHeap<Frontier> = self
            .roots
            .iter()
            .map(|&node| Frontier {
                priority: f32::INFINITY,
                node,
            })
            .collect();

        let mut candidates: Vec<u32> = Vec::with_capacity(search_k);
        while candidates.len() < search_k {
            let Some(Frontier { priority, node }) = frontier.pop() else {
                break;
            };
            match &self.nodes[node as usize] {
                Node::Leaf { items } => candidates.extend_from_slice(items),
                Node::Split {
                    normal,
                    offset,
                    left,
                    right,
                } => {
                    let m = margin(normal, *offset, query);
                    frontier.push(Frontier {
                        priority: priority.min(m),
                        node: *right,
                    });
                    frontier.push(Frontier {
                        priority: priority.min(-m),
                        node: *left,
                    });
                }
            }
        }

        candidates.sort_unstable();
        candidates.dedup();

        let mut ranked: Vec<(f32, u32)> = candidates
            .into_iter()
            .map(|id| (self.metric.distance(query, &self.items[id as usize]), id))
            .collect();
        let is_query = |id: u32| query_id == Some(id);
        ranked.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| is_query(a.1).cmp(&is_query(b.1)))
                .then_with(|| a.1.cmp(&b.1))
        });
        ranked.truncate(k);
        ranked.into_iter().map(|(_, id)| id as usize).collect()
    }

    /// Structural checks run after deserialization
    pub(crate) fn check_integrity(&self) -> std::result::Result<(), String> {
        let n_nodes = self.nodes.len() as u32;
        let n_items = self.items.len() as u32;
        if self.roots.iter().any(|&r| r >= n_nodes) {
            return Err("root points past node arena".to_string());
        }
        for node in &self.nodes {
            match node {
                Node::Leaf { items } => {
                    if items.iter().any(|&i| i >= n_items) {
                        return Err("leaf references unknown item".to_string());
                    }
                }
                Node::Split { left, right, .. } => {
                    if *left >= n_nodes || *right >= n_nodes {
                        return Err("split references unknown node".to_string());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Collects labelled vectors and produces the forest plus its label table.
pub struct IndexBuilder {
    index: AnnIndex,
    labels: LabelTable,
    params: IndexParams,
}

impl IndexBuilder {
    pub fn new(dimension: usize, params: IndexParams) -> Result<Self> {
        Ok(Self {
            index: AnnIndex::new(dimension, params.metric)?,
            labels: LabelTable::new(),
            params,
        })
    }

    /// Insert the next vector; its position is the label table length.
    pub fn add(&mut self, label: Label, vector: &FeatureVector) -> Result<usize> {
        let position = self.labels.len();
        self.index.add_item(position, vector)?;
        self.labels.push(label);
        Ok(position)
    }

    pub fn build(mut self) -> Result<(AnnIndex, LabelTable)> {
        self.index
            .build(self.params.trees, self.params.seed, self.params.leaf_size)?;
        Ok((self.index, self.labels))
    }
}

/// Build a forest from vectors already paired with their label table.
pub fn build_index(
    labels: &LabelTable,
    vectors: &[FeatureVector],
    dimension: usize,
    params: IndexParams,
) -> Result<(AnnIndex, LabelTable)> {
    let mut builder = IndexBuilder::new(dimension, params)?;
    for ((_, label), vector) in labels.iter().zip(vectors) {
        builder.add(label, vector)?;
    }
    builder.build()
}
