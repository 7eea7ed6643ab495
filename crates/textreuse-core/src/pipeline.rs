//! End-to-end reuse detection.
//!
//! Phases run strictly in order, each finishing before the next starts:
//!
//! ```text
//! vectorize ──▶ index (build | save | load) ──▶ query ──▶ score ──▶ aggregate
//! ```
//!
//! Errors are tagged with the name of the phase that raised them.

use std::time::Instant;

use crate::config::{IndexMode, ReuseConfig};
use crate::corpus::Corpus;
use crate::error::{ReuseError, Result};
use crate::index::{build_index, persist, AnnIndex, IndexParams};
use crate::influence::{aggregate_all, InfluenceSummary};
use crate::label::LabelTable;
use crate::neighbors::{query_all, NeighborSets, QueryParams};
use crate::pool::WorkerPool;
use crate::score::{score_all, ScoredCorpus, ScoringContext};
use crate::trace_time;
use crate::vectorize::{vectorize_corpus, Alphabet, Vectorizer};

pub const STAGE_CORPUS: &str = "corpus";
pub const STAGE_INDEX: &str = "index";
pub const STAGE_QUERY: &str = "query";
pub const STAGE_SCORE: &str = "score";

/// Everything a run produces
#[derive(Debug)]
pub struct PipelineOutput {
    pub labels: LabelTable,
    pub neighbors: NeighborSets,
    pub scored: ScoredCorpus,
    pub influence: Vec<InfluenceSummary>,
}

/// A validated configuration plus the resources built from it
pub struct Pipeline {
    config: ReuseConfig,
    vectorizer: Vectorizer,
    pool: WorkerPool,
}

impl Pipeline {
    pub fn new(config: ReuseConfig) -> Result<Self> {
        config.validate()?;
        let alphabet = Alphabet::new(&config.features.alphabet)?;
        let pool = WorkerPool::new(config.runtime.max_workers)?;
        Ok(Self {
            config,
            vectorizer: Vectorizer::new(alphabet),
            pool,
        })
    }

    pub fn config(&self) -> &ReuseConfig {
        &self.config
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Run every phase over `corpus`.
    pub fn run(&self, corpus: &Corpus) -> Result<PipelineOutput> {
        let start = Instant::now();

        let (index, labels) = self.prepare_index(corpus)?;
        let neighbors = self.query(&index)?;
        let scored = self.score(corpus, &labels, &neighbors);

        let phase = Instant::now();
        let influence = aggregate_all(corpus, &labels, &scored);
        trace_time!(phase, "aggregate", documents = influence.len());

        tracing::info!(
            documents = corpus.len(),
            segments = labels.len(),
            records = scored.total_records(),
            skipped = scored.skipped,
            elapsed = ?start.elapsed(),
            "reuse detection finished"
        );

        Ok(PipelineOutput {
            labels,
            neighbors,
            scored,
            influence,
        })
    }

    /// Obtain the index the way the configured mode asks for.
    pub fn prepare_index(&self, corpus: &Corpus) -> Result<(AnnIndex, LabelTable)> {
        match self.config.index.mode {
            IndexMode::Build => self.build_index(corpus),
            IndexMode::Save => {
                let (index, labels) = self.build_index(corpus)?;
                persist::save(&self.config.index.dir, &index, &labels)
                    .map_err(|e| e.in_stage(STAGE_INDEX))?;
                Ok((index, labels))
            }
            IndexMode::Load => self.load_index(corpus),
        }
    }

    /// Vectorize the corpus and build a fresh forest over it.
    pub fn build_index(&self, corpus: &Corpus) -> Result<(AnnIndex, LabelTable)> {
        tracing::info!(documents = corpus.len(), "vectorizing corpus");
        let vectorized = vectorize_corpus(corpus, &self.vectorizer, &self.pool)
            .map_err(|e| e.in_stage(STAGE_CORPUS))?;

        let phase = Instant::now();
        let params = IndexParams::from(&self.config.index);
        let built = build_index(
            &vectorized.labels,
            &vectorized.vectors,
            self.vectorizer.dimension(),
            params,
        )
        .map_err(|e| e.in_stage(STAGE_INDEX))?;
        trace_time!(phase, "index", items = built.0.len(), trees = params.trees);
        Ok(built)
    }

    /// Load a persisted forest and check it fits this corpus and alphabet.
    pub fn load_index(&self, corpus: &Corpus) -> Result<(AnnIndex, LabelTable)> {
        let dir = &self.config.index.dir;
        let (index, labels) = persist::load(dir).map_err(|e| e.in_stage(STAGE_INDEX))?;

        if index.dimension() != self.vectorizer.dimension() {
            return Err(ReuseError::DimensionMismatch {
                expected: self.vectorizer.dimension(),
                actual: index.dimension(),
            }
            .in_stage(STAGE_INDEX));
        }

        if let Some((_, label)) = labels
            .iter()
            .find(|(_, label)| label.doc_id as usize >= corpus.len())
        {
            return Err(ReuseError::CorruptIndex {
                path: dir.clone(),
                reason: format!(
                    "label {} refers to document {} but the corpus has {} documents",
                    label,
                    label.doc_id,
                    corpus.len()
                ),
            }
            .in_stage(STAGE_INDEX));
        }

        Ok((index, labels))
    }

    pub fn query(&self, index: &AnnIndex) -> Result<NeighborSets> {
        let params = QueryParams::from(&self.config.query);
        query_all(index, &params, &self.pool).map_err(|e| e.in_stage(STAGE_QUERY))
    }

    /// Score candidates; unscorable source segments are skipped, never fatal.
    pub fn score(
        &self,
        corpus: &Corpus,
        labels: &LabelTable,
        neighbors: &NeighborSets,
    ) -> ScoredCorpus {
        let ctx = ScoringContext {
            labels,
            corpus,
            min_similarity: self.config.scoring.min_similarity,
        };
        let scored = score_all(neighbors, &ctx, &self.pool);
        if scored.skipped > 0 {
            tracing::warn!(
                stage = STAGE_SCORE,
                skipped = scored.skipped,
                "some segments could not be scored"
            );
        }
        scored
    }
}
