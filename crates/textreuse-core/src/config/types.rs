//! Configuration type definitions

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::index::Metric;

/// Characters kept by the vectorizer: lowercase ASCII letters plus space
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz ";

/// Character n-gram width; the feature space is sized for trigrams only
pub const NGRAM_WIDTH: usize = 3;

/// Run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReuseConfig {
    /// Feature hashing configuration
    #[serde(default)]
    pub features: FeatureConfig,

    /// Index construction and persistence
    #[serde(default)]
    pub index: IndexConfig,

    /// Neighbor query parameters
    #[serde(default)]
    pub query: QueryConfig,

    /// Exact similarity scoring
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Worker pool sizing
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Feature hashing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Permitted characters, in enumeration order
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// N-gram width (must be 3)
    #[serde(default = "default_ngram")]
    pub ngram: usize,
}

/// How the index is obtained for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Build in memory, do not persist
    #[default]
    Build,
    /// Build and persist to the index directory
    Save,
    /// Load a previously persisted index instead of building
    Load,
}

impl std::str::FromStr for IndexMode {
    type Err = crate::error::ReuseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "build" => Ok(IndexMode::Build),
            "save" => Ok(IndexMode::Save),
            "load" => Ok(IndexMode::Load),
            other => Err(crate::error::ReuseError::invalid_value(
                "index mode (expected build, save, or load)",
                other,
            )),
        }
    }
}

/// Index construction and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Number of random projection trees; more trees, better recall
    #[serde(default = "default_trees")]
    pub trees: usize,

    /// Distance used to rank candidates
    #[serde(default)]
    pub metric: Metric,

    /// Seed for hyperplane selection
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum items held by a leaf before it is split
    #[serde(default = "default_leaf_size")]
    pub leaf_size: usize,

    /// Build, save, or load
    #[serde(default)]
    pub mode: IndexMode,

    /// Directory holding `trees.bin` and `labels.json`
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

/// Neighbor query parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Neighbors retrieved per segment
    #[serde(default = "default_knn")]
    pub knn: usize,

    /// Candidate nodes inspected per query (default: knn * trees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_k: Option<usize>,
}

/// Exact similarity scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Pairs with a ratio below this value are discarded
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
}

/// Worker pool sizing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum parallel workers (0 = available parallelism)
    #[serde(default)]
    pub max_workers: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
            ngram: default_ngram(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            metric: Metric::default(),
            seed: default_seed(),
            leaf_size: default_leaf_size(),
            mode: IndexMode::default(),
            dir: default_index_dir(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            knn: default_knn(),
            search_k: None,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
        }
    }
}

fn default_alphabet() -> String {
    DEFAULT_ALPHABET.to_string()
}

fn default_ngram() -> usize {
    NGRAM_WIDTH
}

fn default_trees() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

fn default_leaf_size() -> usize {
    64
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("index")
}

fn default_knn() -> usize {
    3
}

fn default_min_similarity() -> f64 {
    0.5
}
