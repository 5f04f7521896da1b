//! # pdf-impression
//!
//! Build a frequency-ranked vocabulary (an *impression*) from a folder of
//! PDFs.
//!
//! Academic PDFs are noisy: ligatures split words, hyphenation breaks them
//! across lines, and citations, initials, page numbers and URLs drown out the
//! vocabulary a reader actually wants to learn. This crate extracts every
//! document's text, repairs it, tags it, filters the noise away, and counts
//! what is left across the whole corpus.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF directory
//!  │
//!  ├─ 1. Input      list *.pdf (sorted, non-recursive)
//!  ├─ 2. Extract    page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Repair     ligatures, mojibake, hyphenated line breaks
//!  ├─ 4. Tag        tokens with POS, lemma, and flags
//!  ├─ 5. Filter     stopwords, numerals, initials, citations, proper nouns
//!  ├─ 6. Aggregate  merge per-document counts, drop words seen once
//!  ├─ 7. Cache      <outdir>/<label>.txt, reused until --overwrite
//!  ├─ 8. Customize  remove and rewrite words
//!  └─ 9. Rank       top N by count → <outdir>/me.second.txt
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_impression::{ImpressionConfig, ImpressionPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ImpressionConfig::builder("papers/", "out/")
//!         .top_n(100)
//!         .parallelism(4)
//!         .build()?;
//!     let output = ImpressionPipeline::new(config).run().await?;
//!     for wc in &output.ranked {
//!         println!("{}", wc);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `impression` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf-impression = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! Extraction binds to `PDFIUM_LIB_PATH` when set, otherwise to the system
//! library. A cached impression can be re-ranked without pdfium installed.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;
pub mod stream;
pub mod table;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use aggregate::{AggregateStats, Aggregation, CorpusAggregator};
pub use cache::{CacheOutcome, RunCache};
pub use config::{DocumentErrorPolicy, ImpressionConfig, ImpressionConfigBuilder};
pub use error::ImpressionError;
pub use output::{RunOutput, RunSummary};
pub use pipeline::customize::{customize, Customization};
pub use pipeline::document::DocumentProcessor;
pub use pipeline::extract::{Extractor, PdfiumExtractor};
pub use pipeline::filter::{filter_tokens, TokenFilter};
pub use pipeline::rank::rank;
pub use pipeline::repair::{Repairer, UnicodeRepairer};
pub use pipeline::tagger::{Pos, RuleTagger, Tagger, Token};
pub use progress::{NoopProgressCallback, ProgressCallback, SharedProgressCallback};
pub use run::{run, run_sync, ImpressionPipeline};
pub use stream::{document_stream, DocumentResult, DocumentStream};
pub use table::{FrequencyTable, WordCount};
