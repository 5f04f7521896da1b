//! Configuration types for building a word impression.
//!
//! All run behaviour is controlled through [`ImpressionConfig`], built via
//! [`ImpressionConfigBuilder`]. The two directories are required; every
//! other knob has a default matching the `impression` CLI.

use crate::error::ImpressionError;
use crate::pipeline::customize::Customization;
use crate::progress::SharedProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Default cache label.
pub const DEFAULT_LABEL: &str = "me";

/// File stem of the ranked output, fixed regardless of label.
pub const SECOND_PASS_STEM: &str = "me.second";

/// Configuration for one impression run.
///
/// # Example
/// ```rust
/// use pdf_impression::ImpressionConfig;
///
/// let config = ImpressionConfig::builder("papers/", "out/")
///     .label("thesis")
///     .top_n(100)
///     .parallelism(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_count, 2);
/// ```
#[derive(Clone)]
pub struct ImpressionConfig {
    /// Directory scanned (non-recursively) for `*.pdf` files.
    pub pdf_dir: PathBuf,

    /// Directory receiving the cache and ranked outputs. Created if missing.
    pub output_dir: PathBuf,

    /// Name of the first-pass cache, `<output_dir>/<label>.txt`. Default: `"me"`.
    pub label: String,

    /// Number of words kept in the ranked output. Default: 250.
    pub top_n: usize,

    /// Recompute the first pass even when its cache exists. Default: false.
    ///
    /// Without it a cached impression is reused as-is, so PDFs added to the
    /// directory since the cache was written are not seen.
    pub overwrite: bool,

    /// Maximum number of documents processed at once. Default: 1.
    pub parallelism: usize,

    /// Words with a merged corpus count below this are dropped. Default: 2.
    pub min_count: u64,

    /// What to do when a document cannot be processed. Default: abort.
    pub on_document_error: DocumentErrorPolicy,

    /// Words removed before ranking.
    pub denylist: HashSet<String>,

    /// `old → new` rewrites applied before ranking.
    pub rewrites: HashMap<String, String>,

    /// Also write `<label>.cloud.txt` for word-cloud tools. Default: false.
    pub write_cloud: bool,

    /// Receives per-document progress events.
    pub progress_callback: Option<SharedProgressCallback>,
}

impl ImpressionConfig {
    /// Create a builder with every optional field at its default.
    pub fn builder(
        pdf_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> ImpressionConfigBuilder {
        ImpressionConfigBuilder {
            config: Self {
                pdf_dir: pdf_dir.into(),
                output_dir: output_dir.into(),
                label: DEFAULT_LABEL.to_string(),
                top_n: 250,
                overwrite: false,
                parallelism: 1,
                min_count: 2,
                on_document_error: DocumentErrorPolicy::default(),
                denylist: HashSet::new(),
                rewrites: HashMap::new(),
                write_cloud: false,
                progress_callback: None,
            },
        }
    }

    /// Path of the first-pass cache.
    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.txt", self.label))
    }

    /// Path of the ranked output.
    pub fn ranked_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.txt", SECOND_PASS_STEM))
    }

    /// Path of the word-cloud output.
    pub fn cloud_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.cloud.txt", self.label))
    }

    /// Denylist and rewrites as one stage.
    pub fn customization(&self) -> Customization {
        Customization::new(self.denylist.clone(), self.rewrites.clone())
    }
}

impl fmt::Debug for ImpressionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpressionConfig")
            .field("pdf_dir", &self.pdf_dir)
            .field("output_dir", &self.output_dir)
            .field("label", &self.label)
            .field("top_n", &self.top_n)
            .field("overwrite", &self.overwrite)
            .field("parallelism", &self.parallelism)
            .field("min_count", &self.min_count)
            .field("on_document_error", &self.on_document_error)
            .field("denylist", &self.denylist.len())
            .field("rewrites", &self.rewrites.len())
            .field("write_cloud", &self.write_cloud)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ProgressCallback>"),
            )
            .finish()
    }
}

/// Builder for [`ImpressionConfig`].
#[derive(Debug)]
pub struct ImpressionConfigBuilder {
    config: ImpressionConfig,
}

impl ImpressionConfigBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.config.top_n = n;
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    pub fn parallelism(mut self, n: usize) -> Self {
        self.config.parallelism = n;
        self
    }

    pub fn min_count(mut self, n: u64) -> Self {
        self.config.min_count = n;
        self
    }

    pub fn on_document_error(mut self, policy: DocumentErrorPolicy) -> Self {
        self.config.on_document_error = policy;
        self
    }

    pub fn denylist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.denylist = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn rewrites<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config.rewrites = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn write_cloud(mut self, v: bool) -> Self {
        self.config.write_cloud = v;
        self
    }

    pub fn progress_callback(mut self, cb: SharedProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ImpressionConfig, ImpressionError> {
        let c = &self.config;
        if c.top_n == 0 {
            return Err(ImpressionError::InvalidConfig("top_n must be ≥ 1".into()));
        }
        if c.parallelism == 0 {
            return Err(ImpressionError::InvalidConfig(
                "Parallelism must be ≥ 1".into(),
            ));
        }
        if c.min_count == 0 {
            return Err(ImpressionError::InvalidConfig(
                "min_count must be ≥ 1".into(),
            ));
        }
        validate_label(&c.label)?;
        Ok(self.config)
    }
}

/// A label names a file inside the output directory, so it cannot be empty,
/// contain a path separator, or collide with the ranked output.
fn validate_label(label: &str) -> Result<(), ImpressionError> {
    if label.trim().is_empty() {
        return Err(ImpressionError::InvalidConfig("Label must not be empty".into()));
    }
    if label.contains(['/', '\\']) || label == "." || label == ".." {
        return Err(ImpressionError::InvalidConfig(format!(
            "Label '{}' must be a plain file name",
            label
        )));
    }
    if label == SECOND_PASS_STEM {
        return Err(ImpressionError::InvalidConfig(format!(
            "Label '{}' is reserved for the ranked output",
            label
        )));
    }
    Ok(())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How the aggregator reacts to a document that fails to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentErrorPolicy {
    /// Stop at the first failure and return its error. (default)
    #[default]
    Abort,
    /// Log the failure, record the path, and carry on with the rest.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ImpressionConfigBuilder {
        ImpressionConfig::builder("papers", "out")
    }

    #[test]
    fn defaults_match_cli() {
        let c = builder().build().unwrap();
        assert_eq!(c.label, "me");
        assert_eq!(c.top_n, 250);
        assert_eq!(c.parallelism, 1);
        assert_eq!(c.min_count, 2);
        assert!(!c.overwrite);
        assert!(!c.write_cloud);
        assert_eq!(c.on_document_error, DocumentErrorPolicy::Abort);
        assert!(c.customization().is_empty());
    }

    #[test]
    fn artifact_paths() {
        let c = builder().label("thesis").build().unwrap();
        assert_eq!(c.cache_path(), PathBuf::from("out/thesis.txt"));
        assert_eq!(c.ranked_path(), PathBuf::from("out/me.second.txt"));
        assert_eq!(c.cloud_path(), PathBuf::from("out/thesis.cloud.txt"));
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(builder().top_n(0).build().is_err());
        assert!(builder().parallelism(0).build().is_err());
        assert!(builder().min_count(0).build().is_err());
    }

    #[test]
    fn bad_labels_are_rejected() {
        for label in ["", "  ", "a/b", "..", "me.second"] {
            let err = builder().label(label).build().unwrap_err();
            assert!(
                matches!(err, ImpressionError::InvalidConfig(_)),
                "label {label:?} accepted"
            );
        }
    }

    #[test]
    fn word_lists_are_collected() {
        let c = builder()
            .denylist(["figure", "table"])
            .rewrites([("nets", "network")])
            .build()
            .unwrap();
        assert!(c.denylist.contains("figure"));
        assert_eq!(c.rewrites.get("nets").map(String::as_str), Some("network"));
    }

    #[test]
    fn debug_hides_callback() {
        let c = builder().build().unwrap();
        let s = format!("{:?}", c);
        assert!(s.contains("ImpressionConfig"));
        assert!(s.contains("progress_callback: None"));
    }
}
