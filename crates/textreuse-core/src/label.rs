//! Segment labels and the position → label side table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReuseError, Result};

/// Composite key of a segment: owning document and position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    #[serde(rename = "doc")]
    pub doc_id: u32,
    pub segment: u32,
}

impl Label {
    pub fn new(doc_id: u32, segment: u32) -> Self {
        Self { doc_id, segment }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc_id, self.segment)
    }
}

/// Maps dense index positions to segment labels.
///
/// Position `i` is the `i`-th vector inserted into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label, returning its position
    pub fn push(&mut self, label: Label) -> usize {
        self.labels.push(label);
        self.labels.len() - 1
    }

    pub fn get(&self, position: usize) -> Result<Label> {
        self.labels
            .get(position)
            .copied()
            .ok_or(ReuseError::InvalidLabel { position })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Label)> + '_ {
        self.labels.iter().copied().enumerate()
    }
}

impl FromIterator<Label> for LabelTable {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_dense() {
        let mut table = LabelTable::new();
        assert_eq!(table.push(Label::new(0, 0)), 0);
        assert_eq!(table.push(Label::new(0, 1)), 1);
        assert_eq!(table.push(Label::new(1, 0)), 2);
        assert_eq!(table.get(2).unwrap(), Label::new(1, 0));
        assert!(matches!(
            table.get(3),
            Err(ReuseError::InvalidLabel { position: 3 })
        ));
    }

    #[test]
    fn test_two_digit_segments_stay_distinct() {
        // doc 1 segment 2 and doc 1 segment 20 must never collide
        let a = Label::new(1, 2);
        let b = Label::new(1, 20);
        assert_ne!(a, b);

        let table: LabelTable = [a, b].into_iter().collect();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"doc":1,"segment":2},{"doc":1,"segment":20}]"#);

        let back: LabelTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_display() {
        assert_eq!(Label::new(3, 14).to_string(), "3:14");
    }
}
