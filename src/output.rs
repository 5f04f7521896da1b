//! Output types and artifact writers.

use crate::aggregate::AggregateStats;
use crate::error::ImpressionError;
use crate::table::{FrequencyTable, WordCount};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The complete result of one impression run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Corpus table after the cutoff, before customization.
    pub first_pass: FrequencyTable,
    /// Customized table ranked by count, at most `top_n` long.
    pub ranked: Vec<WordCount>,
    /// `<output_dir>/<label>.txt`
    pub cache_path: PathBuf,
    /// `<output_dir>/me.second.txt`
    pub ranked_path: PathBuf,
    /// `<output_dir>/<label>.cloud.txt`, when requested.
    pub cloud_path: Option<PathBuf>,
    /// Whether the first pass was loaded from the cache.
    pub from_cache: bool,
    pub summary: RunSummary,
}

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Documents found in the input directory (0 on a cache hit).
    pub documents_total: usize,
    /// Documents merged into the first pass (0 on a cache hit).
    pub documents_processed: usize,
    /// Documents skipped under the skip policy.
    pub skipped: Vec<PathBuf>,
    /// Distinct words before the cutoff (0 on a cache hit).
    pub distinct_before_cutoff: usize,
    /// Distinct words in the first pass.
    pub first_pass_words: usize,
    /// Entries in the ranked output.
    pub ranked_words: usize,
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,
}

impl RunSummary {
    pub(crate) fn from_stats(stats: Option<AggregateStats>) -> Self {
        let stats = stats.unwrap_or_default();
        Self {
            documents_total: stats.documents_total,
            documents_processed: stats.documents_processed,
            skipped: stats.skipped,
            distinct_before_cutoff: stats.distinct_before_cutoff,
            ..Self::default()
        }
    }
}

/// Word-cloud text: one line per word, the word repeated `count` times.
pub fn cloud_text(ranked: &[WordCount]) -> String {
    let mut out = String::new();
    for wc in ranked {
        let repeats = usize::try_from(wc.count).unwrap_or(usize::MAX);
        let line = vec![wc.word.as_str(); repeats].join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write `contents` to `path` through a `.tmp` sibling and a rename, so
/// readers never see a partial file.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), ImpressionError> {
    let write_err = |source| ImpressionError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = tmp_sibling(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cloud_repeats_each_word() {
        let text = cloud_text(&[WordCount::new("kernel", 3), WordCount::new("matrix", 1)]);
        assert_eq!(text, "kernel kernel kernel\nmatrix\n");
    }

    #[test]
    fn tmp_sibling_keeps_full_name() {
        assert_eq!(
            tmp_sibling(Path::new("out/me.second.txt")),
            PathBuf::from("out/me.second.txt.tmp")
        );
    }

    #[tokio::test]
    async fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.txt");
        write_atomic(&path, "word\tcount\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "word\tcount\n");
        assert!(!tmp_sibling(&path).exists());
    }

    #[tokio::test]
    async fn write_atomic_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn summary_serialises_with_field_names() {
        let s = RunSummary {
            ranked_words: 3,
            skipped: vec![PathBuf::from("papers/blank.pdf")],
            ..RunSummary::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["ranked_words"], 3);
        assert_eq!(json["skipped"][0], "papers/blank.pdf");
    }

    #[test]
    fn summary_defaults_on_cache_hit() {
        let s = RunSummary::from_stats(None);
        assert_eq!(s.documents_total, 0);
        assert!(s.skipped.is_empty());
    }
}
