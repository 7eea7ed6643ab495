//! Neighbor queries for every indexed position.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::QueryConfig;
use crate::error::Result;
use crate::index::AnnIndex;
use crate::pool::WorkerPool;
use crate::trace_time;

/// Query width and search effort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    pub k: usize,
    /// Candidates collected before exact ranking; `None` uses `k * n_trees`
    pub search_k: Option<usize>,
}

impl From<&QueryConfig> for QueryParams {
    fn from(config: &QueryConfig) -> Self {
        Self {
            k: config.knn,
            search_k: config.search_k,
        }
    }
}

/// Position → neighbor positions, nearest first. A position may list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborSets {
    sets: BTreeMap<usize, Vec<usize>>,
}

impl NeighborSets {
    pub fn get(&self, position: usize) -> Option<&[usize]> {
        self.sets.get(&position).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.sets.iter().map(|(&pos, nns)| (pos, nns.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl FromIterator<(usize, Vec<usize>)> for NeighborSets {
    fn from_iter<I: IntoIterator<Item = (usize, Vec<usize>)>>(iter: I) -> Self {
        Self {
            sets: iter.into_iter().collect(),
        }
    }
}

/// Query `params.k` neighbors for every position of `index`.
///
/// Queries run on the pool; the merged mapping is only returned once all of
/// them have finished.
pub fn query_all(
    index: &AnnIndex,
    params: &QueryParams,
    pool: &WorkerPool,
) -> Result<NeighborSets> {
    let start = Instant::now();

    let results: Vec<(usize, Vec<usize>)> = pool.install(|| {
        (0..index.len())
            .into_par_iter()
            .map(|pos| {
                index
                    .get_nns_by_item(pos, params.k, params.search_k)
                    .map(|nns| (pos, nns))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let sets: NeighborSets = results.into_iter().collect();
    trace_time!(
        start,
        "query_neighbors",
        positions = sets.len(),
        k = params.k
    );
    Ok(sets)
}
