//! Error types for the pdf-impression library.
//!
//! A single enum, [`ImpressionError`], covers every failure the pipeline can
//! report. Variants that concern a file always carry its path so the message
//! shown to the user names the offending file.
//!
//! Whether a per-document failure ([`ImpressionError::EmptyDocument`],
//! [`ImpressionError::CorruptPdf`]) aborts the run or is skipped is decided
//! by [`crate::config::DocumentErrorPolicy`], not by the error itself.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-impression library.
#[derive(Debug, Error)]
pub enum ImpressionError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The PDF directory contains no `*.pdf` files.
    #[error("Failed to find any PDF files within '{dir}'")]
    NoInputFiles { dir: PathBuf },

    /// An empty list of documents was handed to the aggregator.
    #[error("No PDF documents were given to aggregate")]
    NoDocuments,

    /// The PDF directory could not be listed.
    #[error("Cannot read PDF directory '{dir}': {source}")]
    InputDirUnreadable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF has zero pages or no extractable text.
    #[error("Found zero pages or no extractable text in PDF '{path}'")]
    EmptyDocument { path: PathBuf },

    /// pdfium could not open or read the document.
    #[error("PDF '{path}' could not be read: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The worker processing the document panicked or was cancelled.
    #[error("Processing of PDF '{path}' failed unexpectedly: {detail}")]
    DocumentTaskFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium system-wide, or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
A previously written impression can still be reused without pdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Cache errors ──────────────────────────────────────────────────────
    /// The cached first-pass table exists but cannot be parsed.
    #[error(
        "Cached impression '{path}' is corrupt at line {line}: {detail}\n\
Re-run with --overwrite to rebuild it."
    )]
    CacheCorruption {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    /// The cached first-pass table exists but cannot be read.
    #[error("Failed to read cached impression '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A denylist or rewrite file is malformed.
    #[error("Invalid word list '{path}' at line {line}: {detail}")]
    InvalidWordList {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImpressionError {
    /// The file or directory this error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ImpressionError::NoInputFiles { dir }
            | ImpressionError::InputDirUnreadable { dir, .. } => Some(dir),
            ImpressionError::EmptyDocument { path }
            | ImpressionError::CorruptPdf { path, .. }
            | ImpressionError::DocumentTaskFailed { path, .. }
            | ImpressionError::CacheCorruption { path, .. }
            | ImpressionError::CacheReadFailed { path, .. }
            | ImpressionError::OutputWriteFailed { path, .. }
            | ImpressionError::InvalidWordList { path, .. } => Some(path),
            ImpressionError::NoDocuments
            | ImpressionError::PdfiumBindingFailed(_)
            | ImpressionError::InvalidConfig(_)
            | ImpressionError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_input_files_names_directory() {
        let e = ImpressionError::NoInputFiles {
            dir: PathBuf::from("papers/"),
        };
        assert!(e.to_string().contains("papers/"), "got: {e}");
    }

    #[test]
    fn empty_document_names_file() {
        let e = ImpressionError::EmptyDocument {
            path: PathBuf::from("papers/blank.pdf"),
        };
        assert!(e.to_string().contains("blank.pdf"));
        assert_eq!(e.path(), Some(std::path::Path::new("papers/blank.pdf")));
    }

    #[test]
    fn cache_corruption_display() {
        let e = ImpressionError::CacheCorruption {
            path: PathBuf::from("out/me.txt"),
            line: 7,
            detail: "count is not a number".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("out/me.txt"), "got: {msg}");
        assert!(msg.contains("line 7"), "got: {msg}");
        assert!(msg.contains("--overwrite"), "got: {msg}");
    }

    #[test]
    fn config_errors_have_no_path() {
        let e = ImpressionError::InvalidConfig("top_n must be ≥ 1".into());
        assert!(e.path().is_none());
        assert!(e.to_string().contains("top_n"));
    }
}
