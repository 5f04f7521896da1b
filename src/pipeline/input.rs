//! Input discovery: list the PDFs of a corpus directory.
//!
//! The listing is non-recursive and sorted, so the same directory always
//! schedules documents in the same order. Only regular files whose
//! extension is `pdf` (any case) are picked up; nothing is opened here.

use crate::error::ImpressionError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sorted paths of the `*.pdf` files directly inside `dir`.
///
/// Fails with [`ImpressionError::NoInputFiles`] when there are none, before
/// any document is touched.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ImpressionError> {
    let unreadable = |source| ImpressionError::InputDirUnreadable {
        dir: dir.to_path_buf(),
        source,
    };

    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }

    if pdfs.is_empty() {
        return Err(ImpressionError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }

    pdfs.sort();
    debug!("Found {} PDFs in {}", pdfs.len(), dir.display());
    Ok(pdfs)
}

/// Whether `path` has a `.pdf` extension, ignoring case.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
