//! Corpus documents and their metadata.
//!
//! Documents get dense ids in input order. Metadata comes from a
//! tab-separated file with one row per document:
//!
//! ```text
//! filename<TAB>title<TAB>year<TAB>id<TAB>author
//! ```
//!
//! Rows are matched to documents by file name. A document without a row is
//! still vectorized and indexed; it simply carries no title or year.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{ReuseError, Result};

/// Descriptive fields of a document from the metadata table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Metadata lookup keyed by file name
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    entries: HashMap<String, DocMeta>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a metadata TSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ReuseError::read_file(path, e))?;
        Ok(Self::parse(&content))
    }

    /// Parse metadata rows; rows with fewer than four fields are skipped.
    pub fn parse(content: &str) -> Self {
        let mut metadata = Self::new();
        for (line_no, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                if !line.trim().is_empty() {
                    tracing::debug!(line = line_no + 1, "skipping short metadata row");
                }
                continue;
            }

            let year = match fields[2].trim().parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    tracing::warn!(
                        line = line_no + 1,
                        value = fields[2],
                        "unparseable year in metadata"
                    );
                    None
                }
            };
            let author = fields
                .get(4)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string);

            metadata.insert(
                fields[0].trim(),
                DocMeta {
                    title: fields[1].trim().to_string(),
                    year,
                    author,
                },
            );
        }
        metadata
    }

    pub fn insert(&mut self, key: impl Into<String>, meta: DocMeta) {
        self.entries.insert(key.into(), meta);
    }

    pub fn lookup(&self, key: &str) -> Option<&DocMeta> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One input document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: u32,
    pub path: PathBuf,
    /// File name used to look up metadata
    pub key: String,
    pub meta: Option<DocMeta>,
}

impl Document {
    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.title.as_str())
    }

    pub fn year(&self) -> Option<i32> {
        self.meta.as_ref().and_then(|m| m.year)
    }

    /// Title if known, otherwise the file name
    pub fn display_name(&self) -> &str {
        self.title().unwrap_or(&self.key)
    }
}

/// Immutable set of documents for a run
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Assign ids to `paths` in order and attach metadata.
    pub fn from_paths(paths: &[PathBuf], metadata: &Metadata) -> Result<Self> {
        if paths.is_empty() {
            return Err(ReuseError::EmptyCorpus);
        }

        let mut missing = 0usize;
        let documents = paths
            .iter()
            .enumerate()
            .map(|(id, path)| {
                let key = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let meta = metadata.lookup(&key).cloned();
                if meta.is_none() {
                    missing += 1;
                    if !metadata.is_empty() {
                        tracing::warn!(document = %key, "no metadata for document");
                    }
                }
                Document {
                    id: id as u32,
                    path: path.clone(),
                    key,
                    meta,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            documents = documents.len(),
            missing_metadata = missing,
            "corpus loaded"
        );
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: u32) -> Option<&Document> {
        self.documents.get(id as usize)
    }

    /// Document by id, or a data error for ids outside the corpus
    pub fn document(&self, id: u32) -> Result<&Document> {
        self.get(id).ok_or_else(|| {
            ReuseError::invalid_value("document id", format!("{} (corpus has {})", id, self.len()))
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Expand inputs into document paths.
///
/// Files are taken as given, in order. Directories are walked recursively
/// for files with the `txt` extension, sorted by path.
pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
                .collect();
            found.sort();
            paths.extend(found);
        } else if input.is_file() {
            paths.push(input.clone());
        } else {
            return Err(ReuseError::read_file(input, "no such file or directory"));
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TSV: &str = "a.txt\tFirst Work\t1700\t0\tAnon\n\
                       b.txt\tSecond Work\t1725\t1\n\
                       short\trow\n\
                       c.txt\tThird Work\tc. 1750\t2\tSmith\n";

    #[test]
    fn test_parse_metadata_rows() {
        let metadata = Metadata::parse(TSV);
        assert_eq!(metadata.len(), 3);

        let a = metadata.lookup("a.txt").unwrap();
        assert_eq!(a.title, "First Work");
        assert_eq!(a.year, Some(1700));
        assert_eq!(a.author.as_deref(), Some("Anon"));

        let b = metadata.lookup("b.txt").unwrap();
        assert_eq!(b.year, Some(1725));
        assert!(b.author.is_none());

        // Unparseable year degrades to None
        assert_eq!(metadata.lookup("c.txt").unwrap().year, None);
        assert!(metadata.lookup("short").is_none());
    }

    #[test]
    fn test_corpus_assigns_ids_in_order() {
        let metadata = Metadata::parse(TSV);
        let paths = vec![
            PathBuf::from("/data/b.txt"),
            PathBuf::from("/data/a.txt"),
            PathBuf::from("/data/unknown.txt"),
        ];
        let corpus = Corpus::from_paths(&paths, &metadata).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.get(0).unwrap().title(), Some("Second Work"));
        assert_eq!(corpus.get(1).unwrap().year(), Some(1700));

        let unknown = corpus.get(2).unwrap();
        assert!(unknown.meta.is_none());
        assert_eq!(unknown.display_name(), "unknown.txt");
        assert!(corpus.document(3).is_err());
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(
            Corpus::from_paths(&[], &Metadata::new()),
            Err(ReuseError::EmptyCorpus)
        ));
    }

    #[test]
    fn test_discover_walks_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(nested.join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("notes.md"), "skip").unwrap();

        let found = discover(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "txt"));
        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }

    #[test]
    fn test_discover_missing_input() {
        let dir = tempdir().unwrap();
        assert!(discover(&[dir.path().join("missing.txt")]).is_err());
    }
}
