//! Browser payloads written by `detect`
//!
//! Layout under the output directory:
//! - `alignments/<id>_alignments.json`: records whose source is document `<id>`
//! - `segments/segments_<id>.json`: the document's segment texts
//! - `influence.json`: one entry per document
//! - `dropdown.json`: `{id, name}` pairs for the document picker
//!
//! Similarity values are rounded to three decimals here and only here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use textreuse_core::corpus::{Corpus, Document};
use textreuse_core::error::{ReuseError, Result};
use textreuse_core::influence::InfluenceSummary;
use textreuse_core::pipeline::PipelineOutput;
use textreuse_core::score::SimilarityRecord;
use textreuse_core::segment::read_segments;

pub const ALIGNMENTS_DIR: &str = "alignments";
pub const SEGMENTS_DIR: &str = "segments";
pub const INFLUENCE_FILE: &str = "influence.json";
pub const DROPDOWN_FILE: &str = "dropdown.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlignmentEntry<'a> {
    source_id: u32,
    source_segment: u32,
    source_title: &'a str,
    source_year: Option<i32>,
    similar_id: u32,
    similar_segment: u32,
    similar_title: &'a str,
    similar_year: Option<i32>,
    similarity: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfluenceEntry<'a> {
    id: u32,
    name: &'a str,
    year: Option<i32>,
    similarity_all: f64,
    similarity_earlier: f64,
    similarity_later: f64,
}

#[derive(Debug, Serialize)]
struct DropdownEntry<'a> {
    id: u32,
    name: &'a str,
}

/// What was written, for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub dir: PathBuf,
    pub documents: usize,
    pub records: usize,
}

fn alignment_entry<'a>(corpus: &'a Corpus, record: &SimilarityRecord) -> Result<AlignmentEntry<'a>> {
    let source = corpus.document(record.source.doc_id)?;
    let similar = corpus.document(record.target.doc_id)?;
    Ok(AlignmentEntry {
        source_id: source.id,
        source_segment: record.source.segment,
        source_title: source.display_name(),
        source_year: record.source_year(),
        similar_id: similar.id,
        similar_segment: record.target.segment,
        similar_title: similar.display_name(),
        similar_year: record.target_year(),
        similarity: record.rounded_similarity(),
    })
}

fn influence_entry<'a>(doc: &'a Document, summary: &InfluenceSummary) -> InfluenceEntry<'a> {
    let rounded = summary.rounded();
    InfluenceEntry {
        id: doc.id,
        name: doc.display_name(),
        year: rounded.year,
        similarity_all: rounded.all,
        similarity_earlier: rounded.earlier,
        similarity_later: rounded.later,
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json).map_err(|e| ReuseError::failed(&format!("write {}", path.display()), e))
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| ReuseError::failed(&format!("create directory {}", path.display()), e))
}

/// Write every artifact for `output` under `out`, creating directories as needed.
pub fn write_artifacts(out: &Path, corpus: &Corpus, output: &PipelineOutput) -> Result<ExportSummary> {
    let alignments_dir = out.join(ALIGNMENTS_DIR);
    let segments_dir = out.join(SEGMENTS_DIR);
    create_dir(&alignments_dir)?;
    create_dir(&segments_dir)?;

    let mut records = 0;
    for doc in corpus.documents() {
        let entries = output
            .scored
            .records_for(doc.id)
            .iter()
            .map(|record| alignment_entry(corpus, record))
            .collect::<Result<Vec<_>>>()?;
        records += entries.len();
        write_json(
            &alignments_dir.join(format!("{}_alignments.json", doc.id)),
            &entries,
        )?;

        let segments = read_segments(&doc.path)?;
        write_json(
            &segments_dir.join(format!("segments_{}.json", doc.id)),
            &segments,
        )?;
    }

    let influence: Vec<InfluenceEntry> = corpus
        .documents()
        .iter()
        .zip(&output.influence)
        .map(|(doc, summary)| influence_entry(doc, summary))
        .collect();
    write_json(&out.join(INFLUENCE_FILE), &influence)?;

    let dropdown: Vec<DropdownEntry> = corpus
        .documents()
        .iter()
        .map(|doc| DropdownEntry {
            id: doc.id,
            name: doc.display_name(),
        })
        .collect();
    write_json(&out.join(DROPDOWN_FILE), &dropdown)?;

    tracing::info!(dir = %out.display(), documents = corpus.len(), records, "exported artifacts");
    Ok(ExportSummary {
        dir: out.to_path_buf(),
        documents: corpus.len(),
        records,
    })
}
