//! Exact scoring of neighbor candidates.
//!
//! The index only proposes candidates. Each (source, neighbor) pair is
//! rescored with the sequence-matcher ratio over the raw segment text, read
//! fresh from disk, and kept only if it clears the minimum similarity and
//! the two segments belong to different documents.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::{Corpus, DocMeta, Document};
use crate::error::Result;
use crate::label::{Label, LabelTable};
use crate::matcher::similarity;
use crate::neighbors::NeighborSets;
use crate::pool::WorkerPool;
use crate::segment::read_segment;
use crate::trace_time;

/// Round to three decimals for output
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// One scored pair of segments from different documents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityRecord {
    pub source: Label,
    pub target: Label,
    pub source_meta: Option<DocMeta>,
    pub target_meta: Option<DocMeta>,
    /// Full-precision ratio in [0, 1]
    pub similarity: f64,
}

impl SimilarityRecord {
    pub fn source_year(&self) -> Option<i32> {
        self.source_meta.as_ref().and_then(|m| m.year)
    }

    pub fn target_year(&self) -> Option<i32> {
        self.target_meta.as_ref().and_then(|m| m.year)
    }

    pub fn rounded_similarity(&self) -> f64 {
        round3(self.similarity)
    }
}

/// Read-only lookups shared by every scoring worker
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub labels: &'a LabelTable,
    pub corpus: &'a Corpus,
    pub min_similarity: f64,
}

impl ScoringContext<'_> {
    /// Score one source position against its neighbors.
    ///
    /// Fails only if the source label or segment cannot be resolved. A
    /// neighbor that cannot be resolved is logged and its pair dropped.
    pub fn score_source(
        &self,
        position: usize,
        neighbors: &[usize],
    ) -> Result<Vec<SimilarityRecord>> {
        let source = self.labels.get(position)?;
        let source_doc = self.corpus.document(source.doc_id)?;
        let source_text = read_segment(&source_doc.path, source.segment as usize)?;

        let mut records = Vec::new();
        for &neighbor in neighbors {
            match self.score_pair(source, source_doc, &source_text, neighbor) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(position, neighbor, error = %e, "skipping unscorable pair");
                }
            }
        }
        Ok(records)
    }

    /// Score a single pair; `None` for same-document or below-threshold pairs.
    fn score_pair(
        &self,
        source: Label,
        source_doc: &Document,
        source_text: &str,
        neighbor: usize,
    ) -> Result<Option<SimilarityRecord>> {
        let target = self.labels.get(neighbor)?;
        if target.doc_id == source.doc_id {
            return Ok(None);
        }
        let target_doc = self.corpus.document(target.doc_id)?;
        let target_text = read_segment(&target_doc.path, target.segment as usize)?;

        let ratio = similarity(source_text, &target_text);
        if ratio < self.min_similarity {
            return Ok(None);
        }

        Ok(Some(SimilarityRecord {
            source,
            target,
            source_meta: source_doc.meta.clone(),
            target_meta: target_doc.meta.clone(),
            similarity: ratio,
        }))
    }
}

/// Scored records grouped by source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredCorpus {
    by_source: BTreeMap<u32, Vec<SimilarityRecord>>,
    /// Source positions dropped because they could not be scored
    pub skipped: usize,
}

impl ScoredCorpus {
    /// Records whose source is `doc_id`, ordered by source segment then target
    pub fn records_for(&self, doc_id: u32) -> &[SimilarityRecord] {
        self.by_source
            .get(&doc_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[SimilarityRecord])> + '_ {
        self.by_source
            .iter()
            .map(|(&doc, records)| (doc, records.as_slice()))
    }

    pub fn total_records(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    fn from_records(records: Vec<SimilarityRecord>, skipped: usize) -> Self {
        let mut by_source: BTreeMap<u32, Vec<SimilarityRecord>> = BTreeMap::new();
        for record in records {
            by_source.entry(record.source.doc_id).or_default().push(record);
        }
        for records in by_source.values_mut() {
            records.sort_by_key(|r| (r.source.segment, r.target.doc_id, r.target.segment));
        }
        Self { by_source, skipped }
    }
}

/// Score every neighbor set on the pool.
///
/// A source position whose own segment cannot be read is logged and
/// skipped; the rest of the batch continues.
pub fn score_all(
    neighbors: &NeighborSets,
    ctx: &ScoringContext<'_>,
    pool: &WorkerPool,
) -> ScoredCorpus {
    let start = Instant::now();
    let items: Vec<(usize, &[usize])> = neighbors.iter().collect();

    let outcomes: Vec<Option<Vec<SimilarityRecord>>> = pool.install(|| {
        items
            .par_iter()
            .map(|&(position, nns)| match ctx.score_source(position, nns) {
                Ok(records) => Some(records),
                Err(e) => {
                    tracing::warn!(position, error = %e, "skipping unscorable segment");
                    None
                }
            })
            .collect()
    });

    let skipped = outcomes.iter().filter(|o| o.is_none()).count();
    let records: Vec<SimilarityRecord> = outcomes.into_iter().flatten().flatten().collect();
    let scored = ScoredCorpus::from_records(records, skipped);

    trace_time!(
        start,
        "score_candidates",
        records = scored.total_records(),
        skipped = skipped
    );
    scored
}
