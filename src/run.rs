//! Run entry points: the full two-pass impression.
//!
//! ```text
//! first pass:  cache hit? ──yes──▶ load <label>.txt
//!                  │no
//!                  └──▶ aggregate PDFs ──▶ write <label>.txt
//! second pass: customize ──▶ rank ──▶ write me.second.txt (+ <label>.cloud.txt)
//! ```
//!
//! [`ImpressionPipeline`] owns the configuration and the collaborators for
//! one run. The pdfium extractor is only created when the first pass is
//! actually computed, so reusing a cached impression works on machines
//! without pdfium.

use crate::aggregate::CorpusAggregator;
use crate::cache::{CacheOutcome, RunCache};
use crate::config::ImpressionConfig;
use crate::error::ImpressionError;
use crate::output::{cloud_text, write_atomic, RunOutput, RunSummary};
use crate::pipeline::document::DocumentProcessor;
use crate::pipeline::extract::{Extractor, PdfiumExtractor};
use crate::pipeline::input;
use crate::pipeline::rank::rank;
use crate::pipeline::repair::{Repairer, UnicodeRepairer};
use crate::pipeline::tagger::{RuleTagger, Tagger};
use crate::table;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// One configured impression run.
///
/// # Example
/// ```rust,no_run
/// use pdf_impression::{ImpressionConfig, ImpressionPipeline};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ImpressionConfig::builder("papers", "out").parallelism(4).build()?;
/// let output = ImpressionPipeline::new(config).run().await?;
/// for wc in output.ranked.iter().take(10) {
///     println!("{}", wc);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ImpressionPipeline {
    config: ImpressionConfig,
    extractor: Option<Arc<dyn Extractor>>,
    repairer: Arc<dyn Repairer>,
    tagger: Arc<dyn Tagger>,
}

impl ImpressionPipeline {
    /// Pipeline with the built-in pdfium extractor, repairer, and tagger.
    pub fn new(config: ImpressionConfig) -> Self {
        Self {
            config,
            extractor: None,
            repairer: Arc::new(UnicodeRepairer),
            tagger: Arc::new(RuleTagger::new()),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_repairer(mut self, repairer: Arc<dyn Repairer>) -> Self {
        self.repairer = repairer;
        self
    }

    pub fn with_tagger(mut self, tagger: Arc<dyn Tagger>) -> Self {
        self.tagger = tagger;
        self
    }

    pub fn config(&self) -> &ImpressionConfig {
        &self.config
    }

    /// Run both passes and write the artifacts.
    ///
    /// # Errors
    /// Fatal errors only: no PDFs, a document failure under the abort
    /// policy, a corrupt cache, or an unwritable output directory.
    pub async fn run(&self) -> Result<RunOutput, ImpressionError> {
        let start = Instant::now();
        let cfg = &self.config;
        info!(
            "Building impression '{}' from {} into {}",
            cfg.label,
            cfg.pdf_dir.display(),
            cfg.output_dir.display()
        );

        tokio::fs::create_dir_all(&cfg.output_dir)
            .await
            .map_err(|e| ImpressionError::OutputWriteFailed {
                path: cfg.output_dir.clone(),
                source: e,
            })?;

        // ── First pass ───────────────────────────────────────────────────
        let cache = RunCache::new(&cfg.output_dir);
        let (first_pass, outcome) = cache
            .load_or_compute(&cfg.label, cfg.overwrite, || async {
                let paths = input::collect_pdfs(&cfg.pdf_dir)?;
                let aggregation = self.aggregator().await?.aggregate(paths).await?;
                Ok((aggregation.table, aggregation.stats))
            })
            .await?;
        let from_cache = outcome.is_hit();

        // ── Second pass ──────────────────────────────────────────────────
        let customized = cfg.customization().apply(&first_pass);
        let ranked = rank(&customized, cfg.top_n);

        let ranked_path = cfg.ranked_path();
        write_atomic(&ranked_path, &table::to_tsv(&ranked)).await?;

        let cloud_path = if cfg.write_cloud {
            let path = cfg.cloud_path();
            write_atomic(&path, &cloud_text(&ranked)).await?;
            Some(path)
        } else {
            None
        };

        let mut summary = RunSummary::from_stats(match outcome {
            CacheOutcome::Computed(stats) => Some(stats),
            CacheOutcome::Hit => None,
        });
        summary.first_pass_words = first_pass.len();
        summary.ranked_words = ranked.len();
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Impression complete: {} ranked words from {} ({}), {}ms",
            summary.ranked_words,
            if from_cache { "cache" } else { "PDFs" },
            cfg.cache_path().display(),
            summary.duration_ms
        );

        Ok(RunOutput {
            first_pass,
            ranked,
            cache_path: cfg.cache_path(),
            ranked_path,
            cloud_path,
            from_cache,
            summary,
        })
    }

    /// Synchronous wrapper around [`ImpressionPipeline::run`].
    ///
    /// Creates a temporary tokio runtime internally.
    pub fn run_sync(&self) -> Result<RunOutput, ImpressionError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| {
                ImpressionError::Internal(format!("Failed to create tokio runtime: {}", e))
            })?
            .block_on(self.run())
    }

    /// Build the aggregator, binding pdfium first when no extractor was
    /// supplied so a missing library fails before any document is scheduled.
    async fn aggregator(&self) -> Result<CorpusAggregator, ImpressionError> {
        let extractor: Arc<dyn Extractor> = match &self.extractor {
            Some(e) => Arc::clone(e),
            None => {
                let pdfium = PdfiumExtractor::new();
                let probe = pdfium.clone();
                tokio::task::spawn_blocking(move || probe.check_binding())
                    .await
                    .map_err(|e| {
                        ImpressionError::Internal(format!("pdfium probe failed: {}", e))
                    })??;
                Arc::new(pdfium)
            }
        };
        let processor =
            DocumentProcessor::new(Arc::clone(&self.repairer), Arc::clone(&self.tagger));
        Ok(CorpusAggregator::from_config(
            &self.config,
            Arc::new(processor),
            extractor,
        ))
    }
}

impl fmt::Debug for ImpressionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpressionPipeline")
            .field("config", &self.config)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn Extractor>"))
            .finish()
    }
}

/// Build an impression with the built-in collaborators.
pub async fn run(config: ImpressionConfig) -> Result<RunOutput, ImpressionError> {
    ImpressionPipeline::new(config).run().await
}

/// Synchronous form of [`run`].
pub fn run_sync(config: ImpressionConfig) -> Result<RunOutput, ImpressionError> {
    ImpressionPipeline::new(config).run_sync()
}
