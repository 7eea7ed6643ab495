//! Character-trigram feature hashing.
//!
//! Every segment becomes a count vector with one dimension per trigram over
//! a fixed alphabet (27^3 = 19,683 dimensions for `a-z` plus space). The
//! trigram → dimension mapping is the lexicographic enumeration of the
//! alphabet in its configured order, so `"aaa"` is 0, `"aab"` is 1, and so on.

use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::NGRAM_WIDTH;
use crate::corpus::Corpus;
use crate::error::{ReuseError, Result};
use crate::label::{Label, LabelTable};
use crate::pool::WorkerPool;
use crate::segment;
use crate::trace_time;

/// Ordered set of characters kept by the vectorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet, rejecting empty input, repeated characters, and
    /// characters that lowercasing would change (they could never match).
    pub fn new(chars: &str) -> Result<Self> {
        let mut seen = Vec::new();
        for c in chars.chars() {
            if !c.to_lowercase().eq(std::iter::once(c)) {
                return Err(ReuseError::InvalidConfig(format!(
                    "alphabet contains {:?}, but text is lowercased before matching",
                    c
                )));
            }
            if seen.contains(&c) {
                return Err(ReuseError::InvalidConfig(format!(
                    "alphabet contains {:?} more than once",
                    c
                )));
            }
            seen.push(c);
        }
        if seen.is_empty() {
            return Err(ReuseError::InvalidConfig(
                "alphabet must not be empty".to_string(),
            ));
        }
        Ok(Self { chars: seen })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            chars: crate::config::DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

/// Trigram → dimension lookup, computed once and shared read-only.
#[derive(Debug, Clone)]
pub struct TrigramTable {
    alphabet: Alphabet,
    positions: HashMap<char, usize>,
}

impl TrigramTable {
    pub fn new(alphabet: Alphabet) -> Self {
        let positions = alphabet
            .chars()
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();
        Self {
            alphabet,
            positions,
        }
    }

    /// Number of dimensions: |alphabet|^3
    pub fn dimension(&self) -> usize {
        self.alphabet.len().pow(NGRAM_WIDTH as u32)
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Position of a character in the alphabet, if permitted
    pub fn position(&self, c: char) -> Option<usize> {
        self.positions.get(&c).copied()
    }

    /// Dense index of a trigram given as alphabet positions
    fn index_of_positions(&self, p: [usize; NGRAM_WIDTH]) -> usize {
        let n = self.alphabet.len();
        (p[0] * n + p[1]) * n + p[2]
    }

    /// Dense index of a trigram, if all three characters are permitted
    pub fn index_of(&self, trigram: &str) -> Option<usize> {
        let mut chars = trigram.chars();
        let a = self.position(chars.next()?)?;
        let b = self.position(chars.next()?)?;
        let c = self.position(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(self.index_of_positions([a, b, c]))
    }

    /// Trigram stored at a dense index
    pub fn trigram_at(&self, index: usize) -> Option<String> {
        if index >= self.dimension() {
            return None;
        }
        let n = self.alphabet.len();
        let chars = self.alphabet.chars();
        Some([chars[index / (n * n)], chars[(index / n) % n], chars[index % n]].iter().collect())
    }
}

/// Fixed-length trigram count vector.
///
/// Counts saturate at `u8::MAX`; a trigram repeated more than 255 times in
/// one segment contributes 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector {
    counts: Vec<u8>,
}

impl FeatureVector {
    pub fn zeros(dimension: usize) -> Self {
        Self {
            counts: vec![0; dimension],
        }
    }

    pub fn from_counts(counts: Vec<u8>) -> Self {
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[u8] {
        &self.counts
    }

    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Non-zero dimensions as `(index, count)` pairs in ascending index order
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != 0)
            .map(|(i, &c)| (i, c))
    }

    fn bump(&mut self, index: usize) {
        self.counts[index] = self.counts[index].saturating_add(1);
    }
}

/// Turns segment text into feature vectors.
#[derive(Debug, Clone)]
pub struct Vectorizer {
    table: TrigramTable,
}

impl Vectorizer {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            table: TrigramTable::new(alphabet),
        }
    }

    pub fn dimension(&self) -> usize {
        self.table.dimension()
    }

    pub fn table(&self) -> &TrigramTable {
        &self.table
    }

    /// Count the trigrams of a segment after lowercasing and alphabet filtering.
    pub fn vectorize(&self, text: &str) -> FeatureVector {
        let filtered: Vec<usize> = text
            .chars()
            .flat_map(char::to_lowercase)
            .filter_map(|c| self.table.position(c))
            .collect();

        let mut vector = FeatureVector::zeros(self.dimension());
        for window in filtered.windows(NGRAM_WIDTH) {
            vector.bump(self.table.index_of_positions([window[0], window[1], window[2]]));
        }
        vector
    }
}

/// Output of the vectorization phase, in label order.
#[derive(Debug)]
pub struct VectorizedCorpus {
    pub labels: LabelTable,
    pub vectors: Vec<FeatureVector>,
}

/// Vectorize every segment of every document on the worker pool.
///
/// Documents are processed in parallel; the merge assigns labels in
/// document-id then segment order, so positions do not depend on which
/// worker finished first. Any unreadable document fails the phase.
pub fn vectorize_corpus(
    corpus: &Corpus,
    vectorizer: &Vectorizer,
    pool: &WorkerPool,
) -> Result<VectorizedCorpus> {
    let start = Instant::now();

    let per_document: Vec<(u32, Vec<FeatureVector>)> = pool.install(|| {
        corpus
            .documents()
            .par_iter()
            .map(|doc| {
                let vectors: Vec<FeatureVector> = segment::read_segments(&doc.path)?
                    .iter()
                    .map(|s| vectorizer.vectorize(s))
                    .collect();
                Ok((doc.id, vectors))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut labels = LabelTable::new();
    let mut vectors = Vec::new();
    for (doc_id, doc_vectors) in per_document {
        for (index, vector) in doc_vectors.into_iter().enumerate() {
            labels.push(Label::new(doc_id, index as u32));
            vectors.push(vector);
        }
    }

    trace_time!(start, "vectorize", segments = labels.len());
    Ok(VectorizedCorpus { labels, vectors })
}
