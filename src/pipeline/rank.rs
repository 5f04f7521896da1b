//! Ranking: order a table by count and keep the head.

use crate::table::{FrequencyTable, WordCount};

/// The `top_n` most frequent words, most frequent first.
///
/// The sort is stable, so equal counts keep the table's iteration order.
/// `top_n` larger than the table returns every word.
pub fn rank(table: &FrequencyTable, top_n: usize) -> Vec<WordCount> {
    let mut ranked: Vec<WordCount> = table.iter().cloned().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, u64)]) -> FrequencyTable {
        pairs.iter().map(|&(w, c)| WordCount::new(w, c)).collect()
    }

    #[test]
    fn keeps_top_n_descending() {
        let t = table(&[("a", 1), ("b", 5), ("c", 3), ("d", 4), ("e", 2)]);
        let ranked = rank(&t, 3);
        assert_eq!(
            ranked,
            vec![WordCount::new("b", 5), WordCount::new("d", 4), WordCount::new("c", 3)]
        );
    }

    #[test]
    fn ties_keep_table_order() {
        let t = table(&[("zeta", 2), ("alpha", 2), ("mid", 3)]);
        let words: Vec<_> = rank(&t, 10).into_iter().map(|wc| wc.word).collect();
        assert_eq!(words, vec!["mid", "zeta", "alpha"]);
    }

    #[test]
    fn top_n_is_clamped_to_table_size() {
        let t = table(&[("x1", 2), ("y1", 3)]);
        assert_eq!(rank(&t, 250).len(), 2);
        assert!(rank(&FrequencyTable::new(), 5).is_empty());
    }
}
