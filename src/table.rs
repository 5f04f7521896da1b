//! Word-frequency tables: the unit every pipeline stage consumes and produces.
//!
//! A [`FrequencyTable`] maps a normalised word to a positive count and
//! remembers insertion order, so iteration (and therefore tie-breaking in
//! [`crate::pipeline::rank`]) is stable within a run.
//!
//! ## On-disk format
//!
//! Tables are persisted as tab-separated text with a `word<TAB>count` header:
//!
//! ```text
//! word	count
//! network	41
//! gradient	17
//! ```
//!
//! [`FrequencyTable::from_tsv`] also accepts the `words<TAB>count` header
//! and header-less files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Header line written by [`FrequencyTable::to_tsv`].
pub const TSV_HEADER: &str = "word\tcount";

/// Legacy header accepted on read.
const LEGACY_TSV_HEADER: &str = "words\tcount";

/// A single normalised word and its occurrence count (always ≥ 1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.word, self.count)
    }
}

/// A parse failure in a persisted table, located by 1-indexed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvError {
    pub line: usize,
    pub detail: String,
}

/// Insertion-ordered mapping from word to positive count.
///
/// Keys are unique and counts are never zero: adding zero is a no-op and
/// [`FrequencyTable::remove`] deletes the entry outright.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<WordCount>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&i| self.entries[i].count)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Add `count` occurrences of `word`, inserting it at the end if new.
    pub fn add(&mut self, word: &str, count: u64) {
        if count == 0 {
            return;
        }
        match self.index.get(word) {
            Some(&i) => self.entries[i].count += count,
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push(WordCount::new(word, count));
            }
        }
    }

    /// Record a single occurrence of `word`.
    pub fn increment(&mut self, word: &str) {
        self.add(word, 1);
    }

    /// Remove `word`, returning its count. Absent words are a no-op.
    pub fn remove(&mut self, word: &str) -> Option<u64> {
        let i = self.index.remove(word)?;
        let removed = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed.count)
    }

    /// Iterate entries in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, WordCount> {
        self.entries.iter()
    }

    /// Sum `other` into `self`: shared words add up, new words are appended
    /// in `other`'s order.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for wc in &other.entries {
            self.add(&wc.word, wc.count);
        }
    }

    /// Drop every word whose count is below `min_count`.
    pub fn retain_min_count(&mut self, min_count: u64) {
        self.entries.retain(|wc| wc.count >= min_count);
        self.reindex();
    }

    /// Reorder by count descending, ties by word ascending.
    ///
    /// Produces the same order regardless of how the table was built, which
    /// makes merged tables independent of worker completion order.
    pub fn sort_canonical(&mut self) {
        self.entries
            .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        self.reindex();
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|wc| wc.count).sum()
    }

    pub fn into_vec(self) -> Vec<WordCount> {
        self.entries
    }

    /// Serialise as tab-separated text with a header line.
    pub fn to_tsv(&self) -> String {
        to_tsv(&self.entries)
    }

    /// Parse a tab-separated table written by [`FrequencyTable::to_tsv`].
    ///
    /// Rejects rows without a tab, empty words, non-numeric or zero counts,
    /// and duplicate words.
    pub fn from_tsv(input: &str) -> Result<Self, TsvError> {
        let mut table = FrequencyTable::new();
        for (i, raw) in input.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }
            if i == 0 && (line == TSV_HEADER || line == LEGACY_TSV_HEADER) {
                continue;
            }

            let (word, count) = line.split_once('\t').ok_or_else(|| TsvError {
                line: line_no,
                detail: "expected '<word>\\t<count>'".to_string(),
            })?;
            if word.is_empty() {
                return Err(TsvError {
                    line: line_no,
                    detail: "empty word".to_string(),
                });
            }
            let count: u64 = count.trim().parse().map_err(|_| TsvError {
                line: line_no,
                detail: format!("count '{}' is not a number", count),
            })?;
            if count == 0 {
                return Err(TsvError {
                    line: line_no,
                    detail: format!("word '{}' has zero count", word),
                });
            }
            if table.contains(word) {
                return Err(TsvError {
                    line: line_no,
                    detail: format!("duplicate word '{}'", word),
                });
            }
            table.add(word, count);
        }
        Ok(table)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, wc) in self.entries.iter().enumerate() {
            self.index.insert(wc.word.clone(), i);
        }
    }
}

/// Serialise any ordered slice of word counts in the on-disk format.
pub fn to_tsv(entries: &[WordCount]) -> String {
    let mut out = String::with_capacity(entries.len() * 16 + TSV_HEADER.len() + 1);
    out.push_str(TSV_HEADER);
    out.push('\n');
    for wc in entries {
        out.push_str(&wc.word);
        out.push('\t');
        out.push_str(&wc.count.to_string());
        out.push('\n');
    }
    out
}

/// Tables are equal when they hold the same (word, count) pairs; order is
/// not significant.
impl PartialEq for FrequencyTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|wc| other.get(&wc.word) == Some(wc.count))
    }
}

impl Eq for FrequencyTable {}

/// Tally words: each item counts as one occurrence.
impl<S: AsRef<str>> FromIterator<S> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for word in iter {
            table.increment(word.as_ref());
        }
        table
    }
}

impl FromIterator<WordCount> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = WordCount>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for wc in iter {
            table.add(&wc.word, wc.count);
        }
        table
    }
}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a WordCount;
    type IntoIter = std::slice::Iter<'a, WordCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for FrequencyTable {
    type Item = WordCount;
    type IntoIter = std::vec::IntoIter<WordCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
