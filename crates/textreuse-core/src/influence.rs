//! Per-document influence from scored records.
//!
//! A document's records are split into three buckets by the target
//! document's year relative to the source's. Within each bucket the best
//! similarity per source segment is taken (0 for segments with no record)
//! and averaged over the document's total segment count, so reuse covering
//! only a small part of a document yields a small mean.

use serde::Serialize;

use crate::corpus::{Corpus, Document};
use crate::label::LabelTable;
use crate::score::{round3, ScoredCorpus, SimilarityRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    All,
    /// Target published before the source
    Earlier,
    /// Target published after the source
    Later,
}

impl Bucket {
    /// Chronological bucket for a pair of years, if any.
    ///
    /// Equal or unknown years belong to `All` only.
    pub fn chronological(source_year: Option<i32>, target_year: Option<i32>) -> Option<Bucket> {
        match (source_year, target_year) {
            (Some(s), Some(t)) if t < s => Some(Bucket::Earlier),
            (Some(s), Some(t)) if t > s => Some(Bucket::Later),
            _ => None,
        }
    }
}

/// Mean per-segment maxima for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceSummary {
    pub doc_id: u32,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub all: f64,
    pub earlier: f64,
    pub later: f64,
}

impl InfluenceSummary {
    pub fn get(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::All => self.all,
            Bucket::Earlier => self.earlier,
            Bucket::Later => self.later,
        }
    }

    /// Copy with each mean rounded to three decimals
    pub fn rounded(&self) -> Self {
        Self {
            all: round3(self.all),
            earlier: round3(self.earlier),
            later: round3(self.later),
            ..self.clone()
        }
    }
}

/// Per-segment maximum similarity within each bucket
struct SegmentMaxima {
    all: Vec<f64>,
    earlier: Vec<f64>,
    later: Vec<f64>,
}

impl SegmentMaxima {
    fn new(segment_count: usize) -> Self {
        Self {
            all: vec![0.0; segment_count],
            earlier: vec![0.0; segment_count],
            later: vec![0.0; segment_count],
        }
    }

    fn record(&mut self, bucket: Bucket, segment: usize, value: f64) {
        let slot = match bucket {
            Bucket::All => &mut self.all[segment],
            Bucket::Earlier => &mut self.earlier[segment],
            Bucket::Later => &mut self.later[segment],
        };
        if value > *slot {
            *slot = value;
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Summarize `doc` from the records whose source it is.
pub fn aggregate(
    doc: &Document,
    records: &[SimilarityRecord],
    segment_count: usize,
) -> InfluenceSummary {
    let source_year = doc.year();
    let mut maxima = SegmentMaxima::new(segment_count);

    for record in records {
        let segment = record.source.segment as usize;
        if segment >= segment_count {
            tracing::warn!(
                doc = doc.id,
                segment,
                segment_count,
                "record for segment past end of document"
            );
            continue;
        }
        maxima.record(Bucket::All, segment, record.similarity);
        if let Some(bucket) = Bucket::chronological(source_year, record.target_year()) {
            maxima.record(bucket, segment, record.similarity);
        }
    }

    InfluenceSummary {
        doc_id: doc.id,
        title: doc.title().map(str::to_string),
        year: source_year,
        all: mean(&maxima.all),
        earlier: mean(&maxima.earlier),
        later: mean(&maxima.later),
    }
}

/// Number of indexed segments per document id
pub fn segment_counts(labels: &LabelTable, n_docs: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_docs];
    for (_, label) in labels.iter() {
        if let Some(count) = counts.get_mut(label.doc_id as usize) {
            *count += 1;
        }
    }
    counts
}

/// Summaries for every document in the corpus, ordered by id
pub fn aggregate_all(
    corpus: &Corpus,
    labels: &LabelTable,
    scored: &ScoredCorpus,
) -> Vec<InfluenceSummary> {
    let counts = segment_counts(labels, corpus.len());
    corpus
        .documents()
        .iter()
        .map(|doc| aggregate(doc, scored.records_for(doc.id), counts[doc.id as usize]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DocMeta;
    use crate::label::Label;
    use std::path::PathBuf;

    fn doc(id: u32, year: Option<i32>) -> Document {
        Document {
            id,
            path: PathBuf::from(format!("doc{id}.txt")),
            key: format!("doc{id}.txt"),
            meta: Some(DocMeta {
                title: format!("Doc {id}"),
                year,
                author: None,
            }),
        }
    }

    fn record(
        source: (u32, u32),
        target: (u32, u32),
        target_year: Option<i32>,
        similarity: f64,
    ) -> SimilarityRecord {
        SimilarityRecord {
            source: Label::new(source.0, source.1),
            target: Label::new(target.0, target.1),
            source_meta: None,
            target_meta: Some(DocMeta {
                title: "target".to_string(),
                year: target_year,
                author: None,
            }),
            similarity,
        }
    }

    #[test]
    fn test_single_match_over_three_segments() {
        let source = doc(0, Some(1800));
        let records = vec![record((0, 1), (1, 0), Some(1750), 0.8)];
        let summary = aggregate(&source, &records, 3).rounded();
        assert_eq!(summary.all, 0.267);
        assert_eq!(summary.earlier, 0.267);
        assert_eq!(summary.later, 0.0);
    }

    #[test]
    fn test_buckets_by_year() {
        let source = doc(0, Some(1800));
        let records = vec![
            record((0, 0), (1, 0), Some(1700), 0.6),
            record((0, 0), (2, 0), Some(1900), 0.9),
            record((0, 1), (3, 0), Some(1800), 0.7),
        ];
        let summary = aggregate(&source, &records, 2);
        // all: max(0.6, 0.9) + 0.7 over 2 segments
        assert!((summary.all - 0.8).abs() < 1e-12);
        assert!((summary.earlier - 0.3).abs() < 1e-12);
        assert!((summary.later - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_years_count_only_toward_all() {
        let source = doc(0, None);
        let records = vec![record((0, 0), (1, 0), Some(1700), 0.5)];
        let summary = aggregate(&source, &records, 1);
        assert_eq!(summary.all, 0.5);
        assert_eq!(summary.earlier, 0.0);
        assert_eq!(summary.later, 0.0);

        let dated = doc(0, Some(1800));
        let records = vec![record((0, 0), (1, 0), None, 0.5)];
        let summary = aggregate(&dated, &records, 1);
        assert_eq!(summary.all, 0.5);
        assert_eq!(summary.earlier, 0.0);
    }

    #[test]
    fn test_no_segments_means_zero() {
        let summary = aggregate(&doc(0, Some(1800)), &[], 0);
        assert_eq!((summary.all, summary.earlier, summary.later), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_all_dominates_chronological_buckets() {
        let source = doc(0, Some(1800));
        let records: Vec<SimilarityRecord> = (0..20)
            .map(|i| {
                let year = 1700 + (i as i32 % 5) * 50;
                record((0, i % 4), (1 + i, 0), Some(year), 0.5 + (i as f64) / 50.0)
            })
            .collect();
        let summary = aggregate(&source, &records, 4);
        for bucket in [Bucket::Earlier, Bucket::Later] {
            let value = summary.get(bucket);
            assert!(value <= summary.all);
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_segment_counts() {
        let labels: LabelTable = vec![
            Label::new(0, 0),
            Label::new(0, 1),
            Label::new(2, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(segment_counts(&labels, 3), vec![2, 0, 1]);
    }
}
