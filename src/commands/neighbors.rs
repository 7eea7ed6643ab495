//! `textreuse neighbors` command - nearest-segment report
//!
//! For each segment, prints the texts of its approximate nearest segments
//! with whitespace collapsed, so index quality can be judged by eye.

use std::collections::HashMap;

use serde::Serialize;

use crate::cli::{NeighborsArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use textreuse_core::corpus::Corpus;
use textreuse_core::error::{ReuseError, Result};
use textreuse_core::label::{Label, LabelTable};
use textreuse_core::pipeline::Pipeline;
use textreuse_core::segment::{read_document_segments, Segment};

#[derive(Debug, Serialize)]
struct NeighborEntry {
    position: usize,
    label: Label,
    text: String,
}

#[derive(Debug, Serialize)]
struct NeighborReport {
    position: usize,
    label: Label,
    neighbors: Vec<NeighborEntry>,
}

/// Collapse runs of whitespace to single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Per-document segment cache so each file is read once per report
struct SegmentCache<'a> {
    corpus: &'a Corpus,
    documents: HashMap<u32, Vec<Segment>>,
}

impl<'a> SegmentCache<'a> {
    fn new(corpus: &'a Corpus) -> Self {
        Self {
            corpus,
            documents: HashMap::new(),
        }
    }

    fn text(&mut self, label: Label) -> Result<String> {
        if !self.documents.contains_key(&label.doc_id) {
            let doc = self.corpus.document(label.doc_id)?;
            let segments = read_document_segments(doc.id, &doc.path)?;
            self.documents.insert(label.doc_id, segments);
        }
        let doc = self.corpus.document(label.doc_id)?;
        self.documents
            .get(&label.doc_id)
            .and_then(|segments| segments.get(label.segment as usize))
            .map(|segment| normalize_whitespace(&segment.text))
            .ok_or_else(|| ReuseError::MissingSegment {
                path: doc.path.clone(),
                segment: label.segment as usize,
            })
    }

    fn entry(&mut self, labels: &LabelTable, position: usize) -> Result<NeighborEntry> {
        let label = labels.get(position)?;
        Ok(NeighborEntry {
            position,
            label,
            text: self.text(label)?,
        })
    }
}

/// Execute the neighbors command
pub fn execute(ctx: &CommandContext, args: &NeighborsArgs) -> Result<()> {
    let config = ctx.load_config(&args.tuning)?;
    let corpus = ctx.load_corpus(&args.corpus)?;
    let pipeline = Pipeline::new(config)?;

    let (index, labels) = pipeline.prepare_index(&corpus)?;
    let neighbors = pipeline.query(&index)?;

    let limit = args.limit.unwrap_or(usize::MAX);
    let mut cache = SegmentCache::new(&corpus);
    let mut reports = Vec::new();
    for (position, nns) in neighbors.iter().take(limit) {
        let label = labels.get(position)?;
        let entries = nns
            .iter()
            .map(|&n| cache.entry(&labels, n))
            .collect::<Result<Vec<_>>>()?;
        reports.push(NeighborReport {
            position,
            label,
            neighbors: entries,
        });
    }

    match ctx.cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Human => {
            for report in &reports {
                println!("[{}] {}", report.label, cache.text(report.label)?);
                for entry in &report.neighbors {
                    println!("  {:>8}  {}", entry.label.to_string(), entry.text);
                }
                println!();
            }
        }
    }
    Ok(())
}
