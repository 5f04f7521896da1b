//! Progress-callback trait for per-document events.
//!
//! Inject an [`Arc<dyn ProgressCallback>`] via
//! [`crate::config::ImpressionConfigBuilder::progress_callback`] to receive
//! events as the aggregator works through the corpus. The `impression` CLI
//! uses it to drive a progress bar.
//!
//! No events fire when the first pass is served from the cache.
//!
//! # Example
//!
//! ```rust
//! use pdf_impression::{ImpressionConfig, ProgressCallback};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, path: &Path, distinct_words: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}: {} words", path.display(), distinct_words);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ImpressionConfig::builder("papers", "out")
//!     .progress_callback(counter as Arc<dyn ProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the aggregator as it processes each document.
///
/// All methods default to no-ops. With `parallelism > 1` the per-document
/// methods may be called from different threads, so shared state needs
/// synchronisation (`Mutex`, `AtomicUsize`, ...).
pub trait ProgressCallback: Send + Sync {
    /// Called once before any document is scheduled.
    fn on_run_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called on the worker thread just before a document is extracted.
    fn on_document_start(&self, path: &Path) {
        let _ = path;
    }

    /// Called when a document has been counted.
    ///
    /// `distinct_words` is the size of its table before the corpus cutoff.
    fn on_document_complete(&self, path: &Path, distinct_words: usize) {
        let _ = (path, distinct_words);
    }

    /// Called when a document fails, whatever the error policy.
    fn on_document_error(&self, path: &Path, error: &str) {
        let _ = (path, error);
    }

    /// Called once after the last document was attempted.
    ///
    /// Under the abort policy this fires with the count reached before the
    /// failure.
    fn on_run_complete(&self, total_documents: usize, succeeded: usize) {
        let _ = (total_documents, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {}

/// The type stored in [`crate::config::ImpressionConfig`].
pub type SharedProgressCallback = Arc<dyn ProgressCallback>;
