//! Exact similarity ratio between two segments.
//!
//! Ratcliff/Obershelp matching: find the longest common block, then recurse
//! on the unmatched pieces to its left and right. The ratio is
//! `2 * matched / (len(a) + len(b))`.
//!
//! For a second sequence of 200 or more characters, characters making up
//! more than 1% of it are "popular" and never start a match, though a match
//! found elsewhere may still extend across them.

use std::collections::HashMap;

const AUTOJUNK_MIN_LEN: usize = 200;

/// A maximal common run: `a[a_start..a_start+len] == b[b_start..b_start+len]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// Positions of each non-popular character in `b`, ascending
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block in `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best_i = alo;
        let mut best_j = blo;
        let mut best_len = 0;

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never seed a match but may extend one
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        MatchBlock {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }

    /// All matching blocks, ordered by position in `a`
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let block = self.find_longest_match(alo, ahi, blo, bhi);
            if block.len == 0 {
                continue;
            }
            let (i, j, k) = (block.a_start, block.b_start, block.len);
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
            blocks.push(block);
        }

        blocks.sort_by_key(|b| (b.a_start, b.b_start));
        blocks
    }

    /// Similarity in [0, 1]; two empty inputs are identical.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|b| b.len).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Shorthand for `SequenceMatcher::new(a, b).ratio()`
pub fn similarity(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical() {
        assert!(close(similarity("the same text", "the same text"), 1.0));
    }

    #[test]
    fn test_both_empty() {
        assert!(close(similarity("", ""), 1.0));
    }

    #[test]
    fn test_one_empty() {
        assert!(close(similarity("abc", ""), 0.0));
    }

    #[test]
    fn test_disjoint() {
        assert!(close(similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_known_ratios() {
        // abcd / bcde share "bcd"
        assert!(close(similarity("abcd", "bcde"), 0.75));
        // Classic example: 2 * 4 / 10
        assert!(close(similarity("abcde", "abxde"), 0.8));
        assert!(close(similarity(" abcd", "abcd abcd"), 2.0 * 5.0 / 14.0));
    }

    #[test]
    fn test_matching_blocks_order() {
        let m = SequenceMatcher::new("abxcd", "abcd");
        let blocks = m.matching_blocks();
        assert_eq!(
            blocks,
            vec![
                MatchBlock {
                    a_start: 0,
                    b_start: 0,
                    len: 2
                },
                MatchBlock {
                    a_start: 3,
                    b_start: 2,
                    len: 2
                },
            ]
        );
    }

    #[test]
    fn test_unicode_counts_chars() {
        assert!(close(similarity("café", "café"), 1.0));
        assert!(close(similarity("é", "e"), 0.0));
    }

    #[test]
    fn test_popular_characters_in_long_sequences() {
        // b is 300 chars of 'a' with a distinct tail; 'a' is popular so it
        // cannot seed a match, only the rare tail can
        let b = format!("{}xyz", "a".repeat(300));
        let a = "aaaxyz";
        let ratio = similarity(a, &b);
        // "xyz" seeds the match and extends back over "aaa"
        assert!(close(ratio, 2.0 * 6.0 / (6.0 + 303.0)));

        // No rare characters: the empty match at the origin still extends
        assert!(close(
            similarity("aaaa", &"a".repeat(300)),
            2.0 * 4.0 / 304.0
        ));
    }

    #[test]
    fn test_symmetry_of_identity() {
        let text = "It was the best of times, it was the worst of times";
        assert!(close(similarity(text, text), 1.0));
    }
}
