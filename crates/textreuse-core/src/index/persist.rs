//! Index persistence.
//!
//! An index directory holds two files:
//! - `trees.bin`: the forest, bincode-encoded with a format version header
//! - `labels.json`: the position → label table
//!
//! Saving creates the directory if needed. Loading checks the format
//! version, the forest's internal references, and that the label table
//! covers exactly the indexed items.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AnnIndex;
use crate::error::{ReuseError, Result};
use crate::label::LabelTable;

/// Forest file name inside an index directory
pub const TREES_FILE: &str = "trees.bin";

/// Label table file name inside an index directory
pub const LABELS_FILE: &str = "labels.json";

/// Bumped whenever the encoded forest layout changes
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct PersistedIndex {
    version: u32,
    index: AnnIndex,
}

/// Borrowing twin of [`PersistedIndex`] with the same encoding
#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    version: u32,
    index: &'a AnnIndex,
}

/// Paths of the files making up a persisted index
pub fn artifact_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(TREES_FILE), dir.join(LABELS_FILE))
}

/// Write the forest and its label table into `dir`.
pub fn save(dir: &Path, index: &AnnIndex, labels: &LabelTable) -> Result<()> {
    if labels.len() != index.len() {
        return Err(ReuseError::invalid_value(
            "label table",
            format!("{} labels for {} indexed items", labels.len(), index.len()),
        ));
    }

    fs::create_dir_all(dir).map_err(|e| {
        ReuseError::failed(&format!("create index directory {}", dir.display()), e)
    })?;

    let (trees_path, labels_path) = artifact_paths(dir);

    let persisted = PersistedIndexRef {
        version: FORMAT_VERSION,
        index,
    };
    let bytes = bincode::serde::encode_to_vec(&persisted, bincode::config::standard())?;
    fs::write(&trees_path, bytes)?;

    let json = serde_json::to_string(labels)?;
    fs::write(&labels_path, json)?;

    tracing::info!(
        dir = %dir.display(),
        items = index.len(),
        trees = index.n_trees(),
        "saved index"
    );
    Ok(())
}

/// Read a forest and label table previously written by [`save`].
pub fn load(dir: &Path) -> Result<(AnnIndex, LabelTable)> {
    let (trees_path, labels_path) = artifact_paths(dir);

    let bytes = fs::read(&trees_path).map_err(|e| ReuseError::read_file(&trees_path, e))?;
    let (persisted, _): (PersistedIndex, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;

    if persisted.version != FORMAT_VERSION {
        return Err(ReuseError::CorruptIndex {
            path: trees_path,
            reason: format!(
                "format version {} (expected {})",
                persisted.version, FORMAT_VERSION
            ),
        });
    }

    let index = persisted.index;
    index
        .check_integrity()
        .map_err(|reason| ReuseError::CorruptIndex {
            path: trees_path.clone(),
            reason,
        })?;

    let json =
        fs::read_to_string(&labels_path).map_err(|e| ReuseError::read_file(&labels_path, e))?;
    let labels: LabelTable = serde_json::from_str(&json)?;

    if labels.len() != index.len() {
        return Err(ReuseError::CorruptIndex {
            path: labels_path,
            reason: format!(
                "{} labels for {} indexed items",
                labels.len(),
                index.len()
            ),
        });
    }

    tracing::info!(
        dir = %dir.display(),
        items = index.len(),
        trees = index.n_trees(),
        "loaded index"
    );
    Ok((index, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{build_index, IndexParams, Metric};
    use crate::label::Label;
    use crate::vectorize::FeatureVector;
    use tempfile::tempdir;

    fn sample() -> (AnnIndex, LabelTable) {
        let dim = 32;
        let vectors: Vec<FeatureVector> = (0..40)
            .map(|i| {
                let mut counts = vec![0u8; dim];
                counts[i % dim] = 3;
                counts[(i * 7) % dim] += 2;
                FeatureVector::from_counts(counts)
            })
            .collect();
        let labels: LabelTable = (0..40u32).map(|i| Label::new(i / 10, i % 10)).collect();
        let params = IndexParams {
            trees: 4,
            metric: Metric::Angular,
            seed: 11,
            leaf_size: 5,
        };
        build_index(&labels, &vectors, dim, params).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_neighbors() {
        let dir = tempdir().unwrap();
        let (index, labels) = sample();
        save(dir.path(), &index, &labels).unwrap();

        let (loaded, loaded_labels) = load(dir.path()).unwrap();
        assert_eq!(loaded_labels, labels);
        assert_eq!(loaded, index);
        for pos in 0..index.len() {
            assert_eq!(
                loaded.get_nns_by_item(pos, 4, Some(20)).unwrap(),
                index.get_nns_by_item(pos, 4, Some(20)).unwrap()
            );
        }
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("index");
        let (index, labels) = sample();
        save(&nested, &index, &labels).unwrap();
        assert!(nested.join(TREES_FILE).exists());
        assert!(nested.join(LABELS_FILE).exists());
    }

    #[test]
    fn test_label_count_mismatch_on_load() {
        let dir = tempdir().unwrap();
        let (index, labels) = sample();
        save(dir.path(), &index, &labels).unwrap();
        fs::write(dir.path().join(LABELS_FILE), r#"[{"doc":0,"segment":0}]"#).unwrap();

        assert!(matches!(
            load(dir.path()),
            Err(ReuseError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(ReuseError::ReadFile { .. })
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let dir = tempdir().unwrap();
        let (index, labels) = sample();
        save(dir.path(), &index, &labels).unwrap();

        let stale = PersistedIndexRef {
            version: 99,
            index: &index,
        };
        let bytes = bincode::serde::encode_to_vec(&stale, bincode::config::standard()).unwrap();
        fs::write(dir.path().join(TREES_FILE), bytes).unwrap();

        assert!(matches!(
            load(dir.path()),
            Err(ReuseError::CorruptIndex { .. })
        ));
    }
}
