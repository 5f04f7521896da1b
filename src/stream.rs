//! Streaming document API: emit per-document tables as they complete.
//!
//! [`document_stream`] runs every document through a
//! [`DocumentProcessor`] on tokio's blocking pool, with at most
//! `parallelism` documents in flight, and yields each result as soon as its
//! worker returns. Results arrive in completion order, not path order.
//!
//! [`crate::aggregate::CorpusAggregator`] is built on this stream; use it
//! directly to show per-document tables or write them out incrementally.

use crate::error::ImpressionError;
use crate::pipeline::document::DocumentProcessor;
use crate::pipeline::extract::Extractor;
use crate::progress::SharedProgressCallback;
use crate::table::FrequencyTable;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// Outcome of processing one document.
#[derive(Debug)]
pub struct DocumentResult {
    pub path: PathBuf,
    pub table: Result<FrequencyTable, ImpressionError>,
}

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Process `paths` concurrently, yielding each document's table as it is
/// ready.
///
/// Dropping the stream stops scheduling new documents. Documents already on
/// the blocking pool run to completion and their results are discarded.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use pdf_impression::pipeline::document::DocumentProcessor;
/// use pdf_impression::pipeline::extract::PdfiumExtractor;
/// use pdf_impression::stream::document_stream;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let paths = vec!["a.pdf".into(), "b.pdf".into()];
/// let mut docs = document_stream(
///     paths,
///     Arc::new(DocumentProcessor::default()),
///     Arc::new(PdfiumExtractor::new()),
///     4,
///     None,
/// );
/// while let Some(doc) = docs.next().await {
///     match doc.table {
///         Ok(t) => println!("{}: {} words", doc.path.display(), t.len()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # }
/// ```
pub fn document_stream(
    paths: Vec<PathBuf>,
    processor: Arc<DocumentProcessor>,
    extractor: Arc<dyn Extractor>,
    parallelism: usize,
    progress: Option<SharedProgressCallback>,
) -> DocumentStream {
    let s = stream::iter(paths.into_iter().map(move |path| {
        let processor = Arc::clone(&processor);
        let extractor = Arc::clone(&extractor);
        let progress = progress.clone();
        async move {
            let job_path = path.clone();
            let table = tokio::task::spawn_blocking(move || {
                if let Some(cb) = &progress {
                    cb.on_document_start(&job_path);
                }
                processor.process_file(extractor.as_ref(), &job_path)
            })
            .await
            .unwrap_or_else(|e| {
                Err(ImpressionError::DocumentTaskFailed {
                    path: path.clone(),
                    detail: e.to_string(),
                })
            });
            DocumentResult { path, table }
        }
    }))
    .buffer_unordered(parallelism.max(1));

    Box::pin(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::repair::UnicodeRepairer;
    use crate::pipeline::tagger::{Tagger, Token};
    use std::path::Path;

    struct WhitespaceTagger;

    impl Tagger for WhitespaceTagger {
        fn tag(&self, text: &str) -> Vec<Token> {
            text.split_whitespace().map(Token::word).collect()
        }
    }

    /// Uses the file stem as the document text; `empty` fails and `explode`
    /// panics.
    struct StemExtractor;

    impl Extractor for StemExtractor {
        fn extract(&self, path: &Path) -> Result<String, ImpressionError> {
            let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
            if stem == "explode" {
                panic!("extractor crashed");
            }
            if stem == "empty" {
                return Err(ImpressionError::EmptyDocument {
                    path: path.to_path_buf(),
                });
            }
            Ok(stem.replace('_', " "))
        }
    }

    fn processor() -> Arc<DocumentProcessor> {
        Arc::new(DocumentProcessor::new(
            Arc::new(UnicodeRepairer),
            Arc::new(WhitespaceTagger),
        ))
    }

    #[tokio::test]
    async fn yields_one_result_per_path() {
        let paths = vec![
            PathBuf::from("kernel_kernel.pdf"),
            PathBuf::from("empty.pdf"),
            PathBuf::from("matrix.pdf"),
        ];
        let results: Vec<DocumentResult> =
            document_stream(paths, processor(), Arc::new(StemExtractor), 2, None)
                .collect()
                .await;

        assert_eq!(results.len(), 3);
        let ok = results.iter().filter(|r| r.table.is_ok()).count();
        assert_eq!(ok, 2);

        let kernel = results
            .iter()
            .find(|r| r.path == Path::new("kernel_kernel.pdf"))
            .unwrap();
        assert_eq!(kernel.table.as_ref().unwrap().get("kernel"), Some(2));
    }

    #[tokio::test]
    async fn empty_path_list_yields_nothing() {
        let results: Vec<DocumentResult> =
            document_stream(vec![], processor(), Arc::new(StemExtractor), 1, None)
                .collect()
                .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn panicking_worker_error_names_the_document() {
        let paths = vec![PathBuf::from("papers/explode.pdf")];
        let results: Vec<DocumentResult> =
            document_stream(paths, processor(), Arc::new(StemExtractor), 1, None)
                .collect()
                .await;

        let err = results[0].table.as_ref().unwrap_err();
        assert!(matches!(err, ImpressionError::DocumentTaskFailed { .. }));
        assert_eq!(err.path(), Some(Path::new("papers/explode.pdf")));
        assert!(err.to_string().contains("papers/explode.pdf"), "got: {err}");
    }
}
