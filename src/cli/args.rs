//! Command argument structures

use std::path::PathBuf;

use clap::Args;

use super::parse::{parse_index_mode, parse_metric, parse_similarity};
use textreuse_core::config::{IndexMode, ReuseConfig};
use textreuse_core::index::Metric;

/// Arguments for the init command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Input documents and their metadata.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Text files or directories (walked for *.txt), in document-id order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Tab-separated metadata: filename, title, year, id, author
    #[arg(long, short)]
    pub metadata: Option<PathBuf>,
}

/// Per-run overrides of configuration file values.
#[derive(Args, Debug, Clone, Default)]
pub struct TuningArgs {
    /// Number of random projection trees
    #[arg(long)]
    pub trees: Option<usize>,

    /// Neighbors queried per segment
    #[arg(long, short = 'k')]
    pub knn: Option<usize>,

    /// Candidates collected per query before exact ranking
    #[arg(long)]
    pub search_k: Option<usize>,

    /// Minimum similarity ratio for a reported match
    #[arg(long, value_parser = parse_similarity)]
    pub min_similarity: Option<f64>,

    /// Maximum worker threads (0 = all cores)
    #[arg(long, short = 'j')]
    pub max_workers: Option<usize>,

    /// How to obtain the index (build, save, load)
    #[arg(long, value_parser = parse_index_mode)]
    pub index_mode: Option<IndexMode>,

    /// Directory holding a saved index
    #[arg(long)]
    pub index_dir: Option<PathBuf>,

    /// Distance metric for neighbor search (angular, euclidean)
    #[arg(long, value_parser = parse_metric)]
    pub metric: Option<Metric>,

    /// Seed for tree construction
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TuningArgs {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ReuseConfig) {
        if let Some(trees) = self.trees {
            config.index.trees = trees;
        }
        if let Some(knn) = self.knn {
            config.query.knn = knn;
        }
        if let Some(search_k) = self.search_k {
            config.query.search_k = Some(search_k);
        }
        if let Some(min_similarity) = self.min_similarity {
            config.scoring.min_similarity = min_similarity;
        }
        if let Some(max_workers) = self.max_workers {
            config.runtime.max_workers = max_workers;
        }
        if let Some(mode) = self.index_mode {
            config.index.mode = mode;
        }
        if let Some(dir) = &self.index_dir {
            config.index.dir = dir.clone();
        }
        if let Some(metric) = self.metric {
            config.index.metric = metric;
        }
        if let Some(seed) = self.seed {
            config.index.seed = seed;
        }
    }
}

/// Arguments for the detect command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Directory for exported alignments, influence, and segments
    #[arg(long, short, default_value = "output")]
    pub out: PathBuf,
}

/// Arguments for the neighbors command.
#[derive(Args, Debug)]
pub struct NeighborsArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Only report the first N segments
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the index command.
#[derive(Args, Debug)]
pub struct IndexArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,
}
