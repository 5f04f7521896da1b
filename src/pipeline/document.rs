//! Document processing: one document's text in, one frequency table out.
//!
//! ```text
//! raw text ──▶ repair ──▶ tag ──▶ filter ──▶ tally
//! ```
//!
//! The processor holds no mutable state. Workers share one instance through
//! an `Arc`, each calling [`DocumentProcessor::process_file`] on its own path.

use crate::error::ImpressionError;
use crate::pipeline::extract::Extractor;
use crate::pipeline::filter::TokenFilter;
use crate::pipeline::repair::{Repairer, UnicodeRepairer};
use crate::pipeline::tagger::{RuleTagger, Tagger};
use crate::table::FrequencyTable;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Repair → tag → filter → tally over a single document.
#[derive(Clone)]
pub struct DocumentProcessor {
    repairer: Arc<dyn Repairer>,
    tagger: Arc<dyn Tagger>,
}

impl DocumentProcessor {
    pub fn new(repairer: Arc<dyn Repairer>, tagger: Arc<dyn Tagger>) -> Self {
        Self { repairer, tagger }
    }

    /// Count the surviving words of `raw_text`.
    pub fn process(&self, raw_text: &str) -> FrequencyTable {
        let repaired = self.repairer.repair(raw_text);
        let tokens = self.tagger.tag(&repaired);
        let table: FrequencyTable = TokenFilter::new(&tokens).collect();
        debug!(
            "{} tokens → {} distinct words ({} occurrences)",
            tokens.len(),
            table.len(),
            table.total()
        );
        table
    }

    /// Extract `path` and count its words.
    ///
    /// Extraction errors (including [`ImpressionError::EmptyDocument`]) are
    /// returned unchanged.
    pub fn process_file(
        &self,
        extractor: &dyn Extractor,
        path: &Path,
    ) -> Result<FrequencyTable, ImpressionError> {
        info!("Processing {}", path.display());
        let text = extractor.extract(path)?;
        Ok(self.process(&text))
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(Arc::new(UnicodeRepairer), Arc::new(RuleTagger::new()))
    }
}

impl fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("repairer", &"<dyn Repairer>")
            .field("tagger", &"<dyn Tagger>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tagger::Token;
    use std::path::PathBuf;

    /// Splits on whitespace; every chunk is a plain noun.
    struct WhitespaceTagger;

    impl Tagger for WhitespaceTagger {
        fn tag(&self, text: &str) -> Vec<Token> {
            text.split_whitespace().map(Token::word).collect()
        }
    }

    struct FixedExtractor(Result<String, ()>);

    impl Extractor for FixedExtractor {
        fn extract(&self, path: &Path) -> Result<String, ImpressionError> {
            self.0.clone().map_err(|_| ImpressionError::EmptyDocument {
                path: path.to_path_buf(),
            })
        }
    }

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(Arc::new(UnicodeRepairer), Arc::new(WhitespaceTagger))
    }

    #[test]
    fn tallies_filtered_words() {
        let table = processor().process("gradient Gradient descent et al gradient");
        assert_eq!(table.get("gradient"), Some(3));
        assert_eq!(table.get("descent"), Some(1));
        assert!(!table.contains("al"));
    }

    #[test]
    fn repair_runs_before_tagging() {
        let table = processor().process("\u{FB01}ne-\ntuning \u{FB01}ne-\ntuning");
        assert_eq!(table.get("finetuning"), Some(2));
    }

    #[test]
    fn empty_text_gives_empty_table() {
        assert!(processor().process("").is_empty());
    }

    #[test]
    fn process_file_propagates_empty_document() {
        let path = PathBuf::from("blank.pdf");
        let err = processor()
            .process_file(&FixedExtractor(Err(())), &path)
            .unwrap_err();
        assert!(matches!(err, ImpressionError::EmptyDocument { path: p } if p == path));
    }

    #[test]
    fn process_file_counts_extracted_text() {
        let extractor = FixedExtractor(Ok("kernel kernel matrix".into()));
        let table = processor()
            .process_file(&extractor, Path::new("a.pdf"))
            .unwrap();
        assert_eq!(table.get("kernel"), Some(2));
        assert_eq!(table.get("matrix"), Some(1));
    }

    #[test]
    fn default_processor_uses_builtin_collaborators() {
        let table = DocumentProcessor::default().process("The networks were trained.");
        assert!(!table.contains("the"));
        assert!(!table.contains("were"));
    }
}
