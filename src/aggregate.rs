//! Corpus aggregation: fan documents out, merge their tables, apply the
//! cutoff.
//!
//! ```text
//! paths ──▶ document_stream (≤ parallelism in flight) ──▶ merge ──▶ cutoff ──▶ sort
//! ```
//!
//! Merging is a per-word sum, so the merged counts do not depend on which
//! worker finishes first. The final table is sorted by count descending
//! (ties by word), which makes the persisted first pass byte-for-byte
//! reproducible.

use crate::config::{DocumentErrorPolicy, ImpressionConfig};
use crate::error::ImpressionError;
use crate::pipeline::document::DocumentProcessor;
use crate::pipeline::extract::Extractor;
use crate::pipeline::input;
use crate::progress::SharedProgressCallback;
use crate::stream::document_stream;
use crate::table::FrequencyTable;
use futures::StreamExt;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Counters from one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Documents found in the input.
    pub documents_total: usize,
    /// Documents whose table was merged.
    pub documents_processed: usize,
    /// Documents that failed and were skipped.
    pub skipped: Vec<PathBuf>,
    /// Distinct words in the merged table before the cutoff.
    pub distinct_before_cutoff: usize,
}

/// Merged corpus table plus counters.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub table: FrequencyTable,
    pub stats: AggregateStats,
}

/// Runs the document processor over a corpus and merges the results.
#[derive(Clone)]
pub struct CorpusAggregator {
    processor: Arc<DocumentProcessor>,
    extractor: Arc<dyn Extractor>,
    parallelism: usize,
    min_count: u64,
    policy: DocumentErrorPolicy,
    progress: Option<SharedProgressCallback>,
}

impl CorpusAggregator {
    /// Aggregator with parallelism 1, cutoff 2, and the abort policy.
    pub fn new(processor: Arc<DocumentProcessor>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            processor,
            extractor,
            parallelism: 1,
            min_count: 2,
            policy: DocumentErrorPolicy::Abort,
            progress: None,
        }
    }

    /// Aggregator taking its knobs from a run configuration.
    pub fn from_config(
        config: &ImpressionConfig,
        processor: Arc<DocumentProcessor>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            processor,
            extractor,
            parallelism: config.parallelism,
            min_count: config.min_count,
            policy: config.on_document_error,
            progress: config.progress_callback.clone(),
        }
    }

    pub fn parallelism(mut self, n: usize) -> Self {
        self.parallelism = n.max(1);
        self
    }

    pub fn min_count(mut self, n: u64) -> Self {
        self.min_count = n;
        self
    }

    pub fn policy(mut self, policy: DocumentErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn progress(mut self, cb: SharedProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    /// Aggregate every `*.pdf` directly inside `dir`.
    pub async fn aggregate_dir(&self, dir: &Path) -> Result<Aggregation, ImpressionError> {
        let paths = input::collect_pdfs(dir)?;
        self.aggregate(paths).await
    }

    /// Aggregate the given documents.
    ///
    /// Fails with [`ImpressionError::NoDocuments`] when `paths` is empty.
    /// Under [`DocumentErrorPolicy::Abort`] the first document error is
    /// returned and nothing further is scheduled. Under
    /// [`DocumentErrorPolicy::Skip`] failures are logged and recorded in
    /// [`AggregateStats::skipped`]; the first error is returned only if no
    /// document succeeded.
    pub async fn aggregate(&self, paths: Vec<PathBuf>) -> Result<Aggregation, ImpressionError> {
        if paths.is_empty() {
            return Err(ImpressionError::NoDocuments);
        }

        let total = paths.len();
        info!(
            "Aggregating {} documents ({} at a time)",
            total, self.parallelism
        );
        if let Some(ref cb) = self.progress {
            cb.on_run_start(total);
        }

        let mut docs = document_stream(
            paths,
            Arc::clone(&self.processor),
            Arc::clone(&self.extractor),
            self.parallelism,
            self.progress.clone(),
        );

        let mut table = FrequencyTable::new();
        let mut stats = AggregateStats {
            documents_total: total,
            ..AggregateStats::default()
        };
        let mut first_error: Option<ImpressionError> = None;

        while let Some(doc) = docs.next().await {
            match doc.table {
                Ok(doc_table) => {
                    if let Some(ref cb) = self.progress {
                        cb.on_document_complete(&doc.path, doc_table.len());
                    }
                    table.merge(&doc_table);
                    stats.documents_processed += 1;
                }
                Err(e) => {
                    if let Some(ref cb) = self.progress {
                        cb.on_document_error(&doc.path, &e.to_string());
                    }
                    match self.policy {
                        DocumentErrorPolicy::Abort => {
                            if let Some(ref cb) = self.progress {
                                cb.on_run_complete(total, stats.documents_processed);
                            }
                            return Err(e);
                        }
                        DocumentErrorPolicy::Skip => {
                            warn!("Skipping {}: {}", doc.path.display(), e);
                            stats.skipped.push(doc.path);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            }
        }

        if let Some(ref cb) = self.progress {
            cb.on_run_complete(total, stats.documents_processed);
        }
        if stats.documents_processed == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        stats.skipped.sort();
        stats.distinct_before_cutoff = table.len();
        table.retain_min_count(self.min_count);
        table.sort_canonical();

        info!(
            "Aggregated {}/{} documents: {} distinct words, {} after cutoff (min count {})",
            stats.documents_processed,
            total,
            stats.distinct_before_cutoff,
            table.len(),
            self.min_count
        );
        Ok(Aggregation { table, stats })
    }
}

impl fmt::Debug for CorpusAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpusAggregator")
            .field("parallelism", &self.parallelism)
            .field("min_count", &self.min_count)
            .field("policy", &self.policy)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ProgressCallback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::repair::UnicodeRepairer;
    use crate::pipeline::tagger::{Tagger, Token};
    use crate::progress::ProgressCallback;
    use crate::table::WordCount;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WhitespaceTagger;

    impl Tagger for WhitespaceTagger {
        fn tag(&self, text: &str) -> Vec<Token> {
            text.split_whitespace().map(Token::word).collect()
        }
    }

    /// Serves fixed text per file name; unknown names are empty documents.
    struct MapExtractor(HashMap<&'static str, &'static str>);

    impl Extractor for MapExtractor {
        fn extract(&self, path: &Path) -> Result<String, ImpressionError> {
            let name = path.file_name().unwrap().to_str().unwrap();
            self.0
                .get(name)
                .map(|t| t.to_string())
                .ok_or_else(|| ImpressionError::EmptyDocument {
                    path: path.to_path_buf(),
                })
        }
    }

    fn aggregator(docs: &[(&'static str, &'static str)]) -> CorpusAggregator {
        let processor =
            DocumentProcessor::new(Arc::new(UnicodeRepairer), Arc::new(WhitespaceTagger));
        CorpusAggregator::new(
            Arc::new(processor),
            Arc::new(MapExtractor(docs.iter().copied().collect())),
        )
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn singleton_cutoff() {
        let agg = aggregator(&[("a.pdf", "kernel kernel matrix")])
            .aggregate(paths(&["a.pdf"]))
            .await
            .unwrap();
        assert_eq!(agg.table.get("kernel"), Some(2));
        assert!(!agg.table.contains("matrix"));
        assert_eq!(agg.stats.distinct_before_cutoff, 2);
    }

    #[tokio::test]
    async fn counts_merge_across_documents() {
        let agg = aggregator(&[("a.pdf", "kernel matrix"), ("b.pdf", "kernel matrix tensor")])
            .parallelism(2)
            .aggregate(paths(&["a.pdf", "b.pdf"]))
            .await
            .unwrap();
        let expected: FrequencyTable =
            vec![WordCount::new("kernel", 2), WordCount::new("matrix", 2)]
                .into_iter()
                .collect();
        assert_eq!(agg.table, expected);
        assert_eq!(agg.stats.documents_processed, 2);
    }

    #[tokio::test]
    async fn result_is_canonically_ordered() {
        let agg = aggregator(&[("a.pdf", "zeta zeta alpha alpha beta beta beta")])
            .aggregate(paths(&["a.pdf"]))
            .await
            .unwrap();
        let words: Vec<_> = agg.table.iter().map(|wc| wc.word.as_str()).collect();
        assert_eq!(words, vec!["beta", "alpha", "zeta"]);
    }

    #[tokio::test]
    async fn empty_path_list_is_no_documents() {
        let err = aggregator(&[]).aggregate(vec![]).await.unwrap_err();
        assert!(matches!(err, ImpressionError::NoDocuments));
        assert!(err.path().is_none());
        assert!(!err.to_string().contains("''"), "got: {err}");
    }

    #[tokio::test]
    async fn abort_policy_returns_first_error() {
        let err = aggregator(&[("a.pdf", "kernel kernel")])
            .aggregate(paths(&["a.pdf", "blank.pdf"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ImpressionError::EmptyDocument { .. }));
    }

    #[tokio::test]
    async fn skip_policy_records_failures() {
        let agg = aggregator(&[("a.pdf", "kernel kernel")])
            .policy(DocumentErrorPolicy::Skip)
            .aggregate(paths(&["a.pdf", "blank.pdf"]))
            .await
            .unwrap();
        assert_eq!(agg.table.get("kernel"), Some(2));
        assert_eq!(agg.stats.skipped, paths(&["blank.pdf"]));
        assert_eq!(agg.stats.documents_processed, 1);
    }

    #[tokio::test]
    async fn skip_policy_fails_when_nothing_succeeds() {
        let err = aggregator(&[])
            .policy(DocumentErrorPolicy::Skip)
            .aggregate(paths(&["x.pdf", "y.pdf"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ImpressionError::EmptyDocument { .. }));
    }

    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        completed: AtomicUsize,
        failed: AtomicUsize,
        succeeded: AtomicUsize,
    }

    impl ProgressCallback for Counter {
        fn on_document_start(&self, _path: &Path) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_complete(&self, _path: &Path, _distinct_words: usize) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_document_error(&self, _path: &Path, _error: &str) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_run_complete(&self, _total: usize, succeeded: usize) {
            self.succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn progress_events_fire_per_document() {
        let counter = Arc::new(Counter::default());
        aggregator(&[("a.pdf", "kernel"), ("b.pdf", "kernel")])
            .policy(DocumentErrorPolicy::Skip)
            .progress(counter.clone())
            .aggregate(paths(&["a.pdf", "b.pdf", "c.pdf"]))
            .await
            .unwrap();
        assert_eq!(counter.started.load(Ordering::SeqCst), 3);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
        assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.succeeded.load(Ordering::SeqCst), 2);
    }
}
