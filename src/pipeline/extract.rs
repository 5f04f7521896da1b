//! Text extraction: read every page's text layer from a PDF via pdfium.
//!
//! ## Why a thread-local binding?
//!
//! Binding pdfium loads a ~30 MB shared library and initialises its global
//! state, which is far too slow to repeat per document. Extraction always
//! runs on tokio's blocking pool, so each blocking worker thread binds once
//! on first use and reuses that binding for every document it handles. No
//! pdfium state is shared between workers.
//!
//! Library lookup order: `PDFIUM_LIB_PATH` (file or directory), then the
//! system library search path.

use crate::error::ImpressionError;
use pdfium_render::prelude::*;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Returns the concatenated text of every page of a document.
///
/// Implementations must fail with [`ImpressionError::EmptyDocument`] when
/// the document has zero pages or no extractable text.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ImpressionError>;
}

thread_local! {
    static PDFIUM: RefCell<Option<Pdfium>> = const { RefCell::new(None) };
}

/// pdfium-backed [`Extractor`].
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    /// Extractor that resolves pdfium from `PDFIUM_LIB_PATH` or the system.
    pub fn new() -> Self {
        Self {
            library_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    /// Extractor bound to an explicit pdfium library (file or directory).
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    /// Bind pdfium on the calling thread now, surfacing a missing library
    /// before any document is scheduled.
    pub fn check_binding(&self) -> Result<(), ImpressionError> {
        self.with_pdfium(|_| Ok(()))
    }

    fn bind(&self) -> Result<Pdfium, ImpressionError> {
        let bindings = match &self.library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(&path.join(platform_library_name()))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ImpressionError::PdfiumBindingFailed(format!("{:?}", e)))?;
        debug!("Bound pdfium on {:?}", std::thread::current().id());
        Ok(Pdfium::new(bindings))
    }

    fn with_pdfium<T>(
        &self,
        f: impl FnOnce(&Pdfium) -> Result<T, ImpressionError>,
    ) -> Result<T, ImpressionError> {
        PDFIUM.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_none() {
                *slot = Some(self.bind()?);
            }
            match slot.as_ref() {
                Some(pdfium) => f(pdfium),
                None => Err(ImpressionError::Internal("pdfium binding vanished".into())),
            }
        })
    }
}

impl Extractor for PdfiumExtractor {
    fn extract(&self, path: &Path) -> Result<String, ImpressionError> {
        self.with_pdfium(|pdfium| extract_with(pdfium, path))
    }
}

/// File name of the pdfium shared library on this platform.
fn platform_library_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "libpdfium.dylib",
        "windows" => "pdfium.dll",
        _ => "libpdfium.so",
    }
}

fn extract_with(pdfium: &Pdfium, pdf_path: &Path) -> Result<String, ImpressionError> {
    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ImpressionError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(ImpressionError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.text().map_err(|e| ImpressionError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        text.push_str(&page_text.all());
    }

    if text.trim().is_empty() {
        return Err(ImpressionError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    debug!(
        "Extracted {} chars from {} pages of {}",
        text.len(),
        total_pages,
        pdf_path.display()
    );
    Ok(text)
}
