//! Customization: user-supplied edits to the corpus table before ranking.
//!
//! Two edits, in this order:
//!
//! 1. **Denylist**: remove words by exact match. Absent words are ignored.
//! 2. **Rewrites**: re-key `old` to `new`, summing counts that land on the
//!    same word.
//!
//! Rewrites are a single pass over the pre-rewrite table: each word is
//! looked up once and never again, so rule order does not matter and chains
//! do not compose. With `{a → b, b → c}` the count of `a` moves to `b` and
//! the original count of `b` moves to `c`.
//!
//! Both lists can be loaded from plain-text files; see [`load_denylist`] and
//! [`load_rewrites`].

use crate::error::ImpressionError;
use crate::table::FrequencyTable;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Denylist plus rewrite rules applied to a frequency table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customization {
    pub denylist: HashSet<String>,
    pub rewrites: HashMap<String, String>,
}

impl Customization {
    pub fn new(denylist: HashSet<String>, rewrites: HashMap<String, String>) -> Self {
        Self { denylist, rewrites }
    }

    pub fn is_empty(&self) -> bool {
        self.denylist.is_empty() && self.rewrites.is_empty()
    }

    /// Apply the denylist, then the rewrites.
    pub fn apply(&self, table: &FrequencyTable) -> FrequencyTable {
        customize(table, &self.denylist, &self.rewrites)
    }
}

/// Remove denylisted words from `table`, then re-key words through
/// `rewrites`.
///
/// The result keeps the input's order of first appearance for each output
/// word.
pub fn customize(
    table: &FrequencyTable,
    denylist: &HashSet<String>,
    rewrites: &HashMap<String, String>,
) -> FrequencyTable {
    let mut out = FrequencyTable::new();
    let mut removed = 0usize;
    let mut rewritten = 0usize;

    for wc in table {
        if denylist.contains(&wc.word) {
            removed += 1;
            continue;
        }
        match rewrites.get(&wc.word) {
            Some(target) => {
                rewritten += 1;
                out.add(target, wc.count);
            }
            None => out.add(&wc.word, wc.count),
        }
    }

    debug!(
        "Customization removed {} words, rewrote {} ({} → {} distinct)",
        removed,
        rewritten,
        table.len(),
        out.len()
    );
    out
}

/// Load a denylist file: one word per line.
///
/// Surrounding whitespace is trimmed; blank lines and `#` comments are
/// skipped.
pub fn load_denylist(path: &Path) -> Result<HashSet<String>, ImpressionError> {
    let text = read_list(path)?;
    Ok(content_lines(&text).map(|(_, line)| line.to_string()).collect())
}

/// Load a rewrite file: `old<TAB>new` per line.
///
/// Blank lines and `#` comments are skipped. A line without a tab, with an
/// empty side, or repeating an earlier `old` fails with
/// [`ImpressionError::InvalidWordList`].
pub fn load_rewrites(path: &Path) -> Result<HashMap<String, String>, ImpressionError> {
    let text = read_list(path)?;
    let mut rewrites = HashMap::new();

    for (line_no, line) in content_lines(&text) {
        let invalid = |detail: String| ImpressionError::InvalidWordList {
            path: path.to_path_buf(),
            line: line_no,
            detail,
        };

        let (old, new) = line
            .split_once('\t')
            .ok_or_else(|| invalid("expected '<old>\\t<new>'".to_string()))?;
        let (old, new) = (old.trim(), new.trim());
        if old.is_empty() || new.is_empty() {
            return Err(invalid("both sides of a rewrite must be non-empty".to_string()));
        }
        if rewrites.insert(old.to_string(), new.to_string()).is_some() {
            return Err(invalid(format!("'{}' is rewritten more than once", old)));
        }
    }

    Ok(rewrites)
}

fn read_list(path: &Path) -> Result<String, ImpressionError> {
    std::fs::read_to_string(path).map_err(|e| ImpressionError::InvalidWordList {
        path: path.to_path_buf(),
        line: 0,
        detail: e.to_string(),
    })
}

/// Non-blank, non-comment lines with their 1-indexed line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_matches(|c: char| c == ' ' || c == '\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::WordCount;
    use std::io::Write;

    fn table(pairs: &[(&str, u64)]) -> FrequencyTable {
        pairs.iter().map(|&(w, c)| WordCount::new(w, c)).collect()
    }

    fn rewrites(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    fn denylist(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn rewrite_collision_sums_counts() {
        let out = customize(
            &table(&[("foo", 3), ("bar", 2)]),
            &HashSet::new(),
            &rewrites(&[("foo", "bar")]),
        );
        assert_eq!(out, table(&[("bar", 5)]));
    }

    #[test]
    fn denylist_of_absent_word_is_noop() {
        let input = table(&[("kernel", 4), ("matrix", 2)]);
        let out = customize(&input, &denylist(&["absent"]), &HashMap::new());
        assert_eq!(out, input);
    }

    #[test]
    fn denylist_runs_before_rewrites() {
        // `foo` is removed, so its rewrite to `bar` never fires.
        let out = customize(
            &table(&[("foo", 3), ("bar", 2)]),
            &denylist(&["foo"]),
            &rewrites(&[("foo", "bar")]),
        );
        assert_eq!(out, table(&[("bar", 2)]));
    }

    #[test]
    fn rewrites_do_not_chain() {
        let out = customize(
            &table(&[("a", 1), ("b", 10)]),
            &HashSet::new(),
            &rewrites(&[("a", "b"), ("b", "c")]),
        );
        assert_eq!(out, table(&[("b", 1), ("c", 10)]));
    }

    #[test]
    fn empty_customization_is_identity() {
        let input = table(&[("x1", 2), ("y1", 3)]);
        let c = Customization::default();
        assert!(c.is_empty());
        assert_eq!(c.apply(&input), input);
    }

    #[test]
    fn load_denylist_skips_comments_and_blanks() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# boilerplate\nfigure\n\n  table  \n").unwrap();
        let words = load_denylist(f.path()).unwrap();
        assert_eq!(words, denylist(&["figure", "table"]));
    }

    #[test]
    fn load_rewrites_parses_tab_pairs() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "# old\tnew\nnets\tnetwork\nconvnet\tnetwork").unwrap();
        let map = load_rewrites(f.path()).unwrap();
        assert_eq!(map, rewrites(&[("nets", "network"), ("convnet", "network")]));
    }

    #[test]
    fn load_rewrites_rejects_missing_tab() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "good\tfine\nbroken line").unwrap();
        let err = load_rewrites(f.path()).unwrap_err();
        assert!(matches!(err, ImpressionError::InvalidWordList { line: 2, .. }));
    }

    #[test]
    fn load_rewrites_rejects_duplicate_source() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "a\tb\na\tc").unwrap();
        assert!(load_rewrites(f.path()).is_err());
    }

    #[test]
    fn missing_list_file_is_reported_with_path() {
        let err = load_denylist(Path::new("/nonexistent/deny.txt")).unwrap_err();
        assert_eq!(err.path(), Some(Path::new("/nonexistent/deny.txt")));
    }
}
