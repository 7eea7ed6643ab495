//! Blank-line segmenter.
//!
//! Splits raw document text on `"\n\n"` into an ordered sequence of
//! segments. Nothing is trimmed or filtered: empty segments keep their
//! position so that a segment index means the same thing to the
//! vectorizer, the scorer, and the exported segment lists.

use std::fs;
use std::path::Path;

use crate::error::{ReuseError, Result};

/// Segment delimiter: two consecutive line breaks
pub const DELIMITER: &str = "\n\n";

/// A blank-line-delimited span of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Owning document id
    pub doc_id: u32,
    /// Zero-based position within the document
    pub index: u32,
    /// Raw text, unnormalized
    pub text: String,
}

/// Lazy iterator over the segments of a text.
///
/// Cloning gives an independent cursor at the same position; call
/// [`segments`] again to start over.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    inner: std::str::Split<'a, &'static str>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Split text into segments in file order.
pub fn segments(text: &str) -> Segments<'_> {
    Segments {
        inner: text.split(DELIMITER),
    }
}

/// Read a document and return its segments.
pub fn read_segments(path: &Path) -> Result<Vec<String>> {
    let text = read_text(path)?;
    Ok(segments(&text).map(str::to_string).collect())
}

/// Read a single segment by index.
pub fn read_segment(path: &Path, index: usize) -> Result<String> {
    let text = read_text(path)?;
    segments(&text)
        .nth(index)
        .map(str::to_string)
        .ok_or_else(|| ReuseError::MissingSegment {
            path: path.to_path_buf(),
            segment: index,
        })
}

/// Read a document and wrap its segments with their labels.
pub fn read_document_segments(doc_id: u32, path: &Path) -> Result<Vec<Segment>> {
    let text = read_text(path)?;
    Ok(segments(&text)
        .enumerate()
        .map(|(index, s)| Segment {
            doc_id,
            index: index as u32,
            text: s.to_string(),
        })
        .collect())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ReuseError::read_file(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_single_segment() {
        let parts: Vec<_> = segments("one paragraph\nwith a line break").collect();
        assert_eq!(parts, vec!["one paragraph\nwith a line break"]);
    }

    #[test]
    fn test_splits_on_blank_line() {
        let parts: Vec<_> = segments("first\n\nsecond\n\nthird").collect();
        assert_eq!(parts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_preserves_empty_trailing_segment() {
        let parts: Vec<_> = segments("first\n\nsecond\n\n").collect();
        assert_eq!(parts, vec!["first", "second", ""]);
    }

    #[test]
    fn test_preserves_empty_inner_segment() {
        // Four newlines produce an empty segment between the two paragraphs
        let parts: Vec<_> = segments("a\n\n\n\nb").collect();
        assert_eq!(parts, vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_text_is_one_empty_segment() {
        let parts: Vec<_> = segments("").collect();
        assert_eq!(parts, vec![""]);
    }

    #[test]
    fn test_restartable() {
        let text = "a\n\nb";
        let first = segments(text);
        let second = first.clone();
        assert_eq!(first.count(), 2);
        assert_eq!(second.collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_read_segment_by_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "alpha\n\nbeta\n\ngamma").unwrap();

        assert_eq!(read_segment(&path, 1).unwrap(), "beta");
        assert!(matches!(
            read_segment(&path, 3),
            Err(ReuseError::MissingSegment { segment: 3, .. })
        ));
    }

    #[test]
    fn test_read_document_segments_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "alpha\n\nbeta").unwrap();

        let segs = read_document_segments(4, &path).unwrap();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].doc_id, 4);
        assert_eq!(segs[1].index, 1);
        assert_eq!(segs[1].text, "beta");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let err = read_segments(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ReuseError::ReadFile { .. }));
    }

    #[test]
    fn test_non_utf8_is_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert!(matches!(
            read_segments(&path),
            Err(ReuseError::ReadFile { .. })
        ));
    }
}
