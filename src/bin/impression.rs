//! CLI binary for pdf-impression.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ImpressionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_impression::pipeline::customize::{load_denylist, load_rewrites};
use pdf_impression::{
    DocumentErrorPolicy, ImpressionConfig, ImpressionPipeline, ProgressCallback,
    SharedProgressCallback,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Renders a progress bar over the corpus plus one log line per document.
/// Documents may finish out of order when `--nproc > 1`.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<PathBuf, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us how many documents there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning PDF directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} PDFs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Reading");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, path: &Path) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(path))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Stop the spinner if the run ended before `on_run_start`, e.g. on a
    /// cache hit.
    fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Reading {total_documents} PDFs…"))
        ));
    }

    fn on_document_start(&self, path: &Path) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(path.to_path_buf(), Instant::now());
        }
        self.bar.set_message(file_name(path));
    }

    fn on_document_complete(&self, path: &Path, distinct_words: usize) {
        let secs = self.elapsed_secs(path);
        self.bar.println(format!(
            "  {} {:<40}  {:<12}  {}",
            green("✓"),
            file_name(path),
            dim(&format!("{distinct_words:>6} words")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, path: &Path, error: &str) {
        let secs = self.elapsed_secs(path);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(std::iter::once('…')).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<40}  {}  {}",
            red("✗"),
            file_name(path),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_documents: usize, succeeded: usize) {
        let failed = total_documents.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} PDFs read successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} PDFs read  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total_documents,
                red(&self.errors.load(Ordering::SeqCst).to_string()),
            );
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Build an impression of a folder of papers
  impression --pdf-dir papers/ --outdir out/

  # Four PDFs at a time, keep the 100 most frequent words
  impression --pdf-dir papers/ --outdir out/ --nproc 4 --top-n 100

  # Re-read the PDFs instead of reusing out/me.txt
  impression --pdf-dir papers/ --outdir out/ --overwrite

  # Edit the result without re-reading any PDF
  impression --pdf-dir papers/ --outdir out/ \
      --remove-words deny.txt --replace-words rewrites.tsv --print

OUTPUT FILES:
  <outdir>/<me>.txt          first pass: every word counted at least twice
  <outdir>/me.second.txt     ranked top-N after removals and replacements
  <outdir>/<me>.cloud.txt    with --cloud: each word repeated by its count

WORD LIST FORMATS:
  --remove-words   one word per line
  --replace-words  old<TAB>new per line
  Blank lines and lines starting with '#' are ignored.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override the log filter, e.g. RUST_LOG=pdf_impression=debug
"#;

/// Build a frequency-ranked vocabulary from a folder of PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "impression",
    version,
    about = "Build a frequency-ranked vocabulary from a folder of PDFs",
    long_about = "Extract the text of every PDF in a directory, drop stopwords, numerals, \
citations and other page furniture, count what remains across the corpus, and write the \
most frequent words. The first pass is cached under a label so later runs only redo the \
cheap ranking step.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDFs (not searched recursively).
    #[arg(long, visible_alias = "pdf_dir", env = "IMPRESSION_PDF_DIR")]
    pdf_dir: PathBuf,

    /// Directory for the cached first pass and the ranked output.
    #[arg(long, env = "IMPRESSION_OUTDIR")]
    outdir: PathBuf,

    /// Label of the cached first pass (<outdir>/<me>.txt).
    #[arg(long, env = "IMPRESSION_ME", default_value = "me")]
    me: String,

    /// Number of words kept in me.second.txt.
    #[arg(long, visible_alias = "top_n", env = "IMPRESSION_TOP_N", default_value_t = 250,
          value_parser = clap::value_parser!(u64).range(1..))]
    top_n: u64,

    /// Re-read the PDFs even if the first pass is cached.
    #[arg(long, env = "IMPRESSION_OVERWRITE")]
    overwrite: bool,

    /// Number of PDFs processed at once.
    #[arg(long, env = "IMPRESSION_NPROC", default_value_t = 1,
          value_parser = clap::value_parser!(u64).range(1..))]
    nproc: u64,

    /// Drop words counted fewer times than this across the corpus.
    #[arg(long, visible_alias = "min_count", env = "IMPRESSION_MIN_COUNT", default_value_t = 2,
          value_parser = clap::value_parser!(u64).range(1..))]
    min_count: u64,

    /// Log and skip unreadable PDFs instead of aborting.
    #[arg(long, env = "IMPRESSION_SKIP_FAILED")]
    skip_failed: bool,

    /// File of words to remove before ranking (one per line).
    #[arg(long, visible_alias = "remove_words", env = "IMPRESSION_REMOVE_WORDS")]
    remove_words: Option<PathBuf>,

    /// File of replacements to apply before ranking (old<TAB>new per line).
    #[arg(long, visible_alias = "replace_words", env = "IMPRESSION_REPLACE_WORDS")]
    replace_words: Option<PathBuf>,

    /// Also write <outdir>/<me>.cloud.txt for word-cloud tools.
    #[arg(long, env = "IMPRESSION_CLOUD")]
    cloud: bool,

    /// Print the ranked words as `word: count` lines.
    #[arg(long, env = "IMPRESSION_PRINT")]
    print: bool,

    /// Print the ranked words and run summary as JSON.
    #[arg(long, env = "IMPRESSION_JSON", conflicts_with = "print")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "IMPRESSION_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMPRESSION_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMPRESSION_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb = show_progress.then(CliProgressCallback::new_dynamic);
    let config = build_config(
        &cli,
        progress_cb
            .clone()
            .map(|cb| cb as Arc<dyn ProgressCallback>),
    )?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = ImpressionPipeline::new(config).run().await;
    if let Some(ref cb) = progress_cb {
        cb.finish();
    }
    let output = result.context("Failed to build impression")?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let json = serde_json::json!({
            "ranked": output.ranked,
            "from_cache": output.from_cache,
            "summary": output.summary,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise output")?
        );
    } else if cli.print {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for wc in &output.ranked {
            writeln!(handle, "{}", wc).context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        let source = if output.from_cache {
            format!("cached {}", output.cache_path.display())
        } else {
            format!(
                "{}/{} PDFs",
                output.summary.documents_processed, output.summary.documents_total
            )
        };
        eprintln!(
            "{}  {} words from {}  {}ms  →  {}",
            if output.summary.skipped.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            },
            output.summary.ranked_words,
            source,
            output.summary.duration_ms,
            bold(&output.ranked_path.display().to_string()),
        );
        if output.from_cache {
            eprintln!(
                "   {}",
                dim("first pass reused; pass --overwrite to re-read the PDFs")
            );
        }
        for path in &output.summary.skipped {
            eprintln!("   {} {}", red("skipped"), path.display());
        }
        if let Some(ref cloud) = output.cloud_path {
            eprintln!("   word cloud  →  {}", cloud.display());
        }
    }

    Ok(())
}

/// Map CLI args to `ImpressionConfig`.
fn build_config(cli: &Cli, progress: Option<SharedProgressCallback>) -> Result<ImpressionConfig> {
    let mut builder = ImpressionConfig::builder(&cli.pdf_dir, &cli.outdir)
        .label(cli.me.clone())
        .top_n(usize::try_from(cli.top_n).context("--top-n is too large")?)
        .overwrite(cli.overwrite)
        .parallelism(usize::try_from(cli.nproc).context("--nproc is too large")?)
        .min_count(cli.min_count)
        .write_cloud(cli.cloud)
        .on_document_error(if cli.skip_failed {
            DocumentErrorPolicy::Skip
        } else {
            DocumentErrorPolicy::Abort
        });

    if let Some(ref path) = cli.remove_words {
        let words = load_denylist(path)
            .with_context(|| format!("Failed to read word list {:?}", path))?;
        builder = builder.denylist(words);
    }
    if let Some(ref path) = cli.replace_words {
        let rewrites = load_rewrites(path)
            .with_context(|| format!("Failed to read replacements {:?}", path))?;
        builder = builder.rewrites(rewrites);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
