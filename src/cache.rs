//! Run cache: persist the first-pass corpus table under a label.
//!
//! Aggregating a large corpus means extracting and tagging every PDF, so the
//! result is written to `<dir>/<label>.txt` and reused by later runs with
//! the same label. Reuse is unconditional: the cache is not invalidated when
//! the PDF directory changes, only when the caller asks to overwrite it.
//!
//! A cache file that exists but does not parse is an error, never a silent
//! recompute. Writes go through a temporary sibling and a rename, so an
//! interrupted run leaves either the old artifact or none at all.

use crate::error::ImpressionError;
use crate::output::write_atomic;
use crate::table::FrequencyTable;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a first-pass table came from.
///
/// `Computed` carries whatever the compute step returned alongside the
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome<T> {
    /// Loaded from an existing artifact; the compute step never ran.
    Hit,
    /// Freshly computed and written.
    Computed(T),
}

impl<T> CacheOutcome<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit)
    }
}

/// Label-addressed store of first-pass tables inside one directory.
#[derive(Debug, Clone)]
pub struct RunCache {
    dir: PathBuf,
}

impl RunCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifact path for `label`.
    pub fn artifact_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.txt", label))
    }

    /// Load the artifact for `label`, or `None` if it does not exist.
    pub async fn load(&self, label: &str) -> Result<Option<FrequencyTable>, ImpressionError> {
        let path = self.artifact_path(label);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ImpressionError::CacheReadFailed { path, source }),
        };
        parse_artifact(&path, &text).map(Some)
    }

    /// Write `table` as the artifact for `label`.
    pub async fn store(
        &self,
        label: &str,
        table: &FrequencyTable,
    ) -> Result<PathBuf, ImpressionError> {
        let path = self.artifact_path(label);
        write_atomic(&path, &table.to_tsv()).await?;
        debug!("Wrote {} words to {}", table.len(), path.display());
        Ok(path)
    }

    /// Return the cached table for `label`, or run `compute` and cache its
    /// table.
    ///
    /// With `overwrite == false` and an existing artifact, `compute` is not
    /// called. A failed `compute` leaves any existing artifact untouched.
    pub async fn load_or_compute<T, F, Fut>(
        &self,
        label: &str,
        overwrite: bool,
        compute: F,
    ) -> Result<(FrequencyTable, CacheOutcome<T>), ImpressionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(FrequencyTable, T), ImpressionError>>,
    {
        if !overwrite {
            if let Some(table) = self.load(label).await? {
                info!(
                    "Reusing cached impression {} ({} words); pass --overwrite to rebuild",
                    self.artifact_path(label).display(),
                    table.len()
                );
                return Ok((table, CacheOutcome::Hit));
            }
        }

        let (table, extra) = compute().await?;
        self.store(label, &table).await?;
        Ok((table, CacheOutcome::Computed(extra)))
    }
}

fn parse_artifact(path: &Path, text: &str) -> Result<FrequencyTable, ImpressionError> {
    FrequencyTable::from_tsv(text).map_err(|e| ImpressionError::CacheCorruption {
        path: path.to_path_buf(),
        line: e.line,
        detail: e.detail,
    })
}
