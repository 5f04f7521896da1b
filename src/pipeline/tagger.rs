//! Tagging: turn repaired text into a sequence of annotated [`Token`]s.
//!
//! The filter stage only reads token attributes; it never cares how they
//! were produced. [`Tagger`] is the seam, and [`RuleTagger`] is the built-in
//! implementation: UAX-29 word segmentation, an English stopword list, and
//! a handful of spelling heuristics for part of speech.
//!
//! `RuleTagger` is not a statistical tagger. Its job is to produce the
//! attributes the filter keys on (stopword, punctuation, title-case,
//! numerals, URL/e-mail shapes, plural nouns and their singular lemma)
//! consistently enough for word-frequency counting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use stop_words::{get, LANGUAGE};
use unicode_segmentation::UnicodeSegmentation;

/// Universal Dependencies coarse part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Space,
}

impl Pos {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
            Pos::Space => "SPACE",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One annotated token. All fields are always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text exactly as it appears in the document.
    pub text: String,
    /// Dictionary form (plural nouns are singularised).
    pub lemma: String,
    /// Coarse part of speech.
    pub pos: Pos,
    /// Penn Treebank fine-grained tag, e.g. `NN`, `NNS`, `NNP`, `CD`.
    pub fine_tag: String,
    pub is_stop: bool,
    pub is_punct: bool,
    pub is_space: bool,
    pub like_url: bool,
    pub like_email: bool,
    pub is_title: bool,
}

impl Token {
    /// A plain lowercase common noun with all flags cleared.
    ///
    /// Convenient base for building tokens by hand:
    /// `Token { pos: Pos::Num, ..Token::word("42") }`.
    pub fn word(text: &str) -> Self {
        Self {
            text: text.to_string(),
            lemma: text.to_lowercase(),
            pos: Pos::Noun,
            fine_tag: "NN".to_string(),
            is_stop: false,
            is_punct: false,
            is_space: false,
            like_url: false,
            like_email: false,
            is_title: false,
        }
    }
}

/// Produces tokens from repaired document text.
///
/// Implementations are built once per run and shared read-only across
/// workers, hence `Send + Sync`. Tagging must be deterministic for a given
/// implementation.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<Token>;
}

// ── Lexicons ──────────────────────────────────────────────────────────────

const AUXILIARIES: &[&str] = &[
    "be", "is", "am", "are", "was", "were", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "ought",
];

const MODALS: &[&str] = &[
    "will", "would", "shall", "should", "may", "might", "must", "can", "could", "ought",
];

const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "to", "from", "up", "down",
    "over", "under", "via", "per", "among", "amongst", "within", "without", "across",
    "toward", "towards", "upon", "onto", "despite", "versus", "vs", "throughout", "beyond",
    "near", "along", "alongside", "around", "beside", "besides", "inside", "outside",
];

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "each", "every", "some", "any",
    "no", "either", "neither", "another",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "we", "us", "our", "ours", "you", "your", "yours", "he", "him",
    "his", "she", "her", "hers", "it", "its", "they", "them", "their", "theirs", "itself",
    "themselves", "ourselves", "who", "whom", "whose", "which", "what",
];

const COORDINATORS: &[&str] = &["and", "or", "but", "nor", "yet"];

const SUBORDINATORS: &[&str] = &[
    "if", "because", "although", "though", "while", "whereas", "unless", "since", "whether",
];

const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "thirty", "forty", "fifty", "hundred", "thousand",
    "million", "billion",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ive", "able", "ible", "ical", "ful", "less", "ary", "ic", "al", "ish",
];

/// Characters tagged `SYM` rather than `PUNCT` when a token is made of them.
const SYMBOL_CHARS: &str = "+<=>|~^$%#@&*\\×±°∑∏∫√∞≤≥≈≠∈∉⊂⊆∪∩→←↔⇒⇔∀∃∂∇·•€£¥©®™";

static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+([.,]\d+)*|\.\d+)(%|st|nd|rd|th)?$").unwrap());

static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:https?|ftp)://\S+|www\.\S+|[a-z0-9-]+(?:\.[a-z0-9-]+)*\.(?:com|org|net|edu|gov|io|ai|info|int)(?:/\S*)?)$",
    )
    .unwrap()
});

static RE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.+-]+@[\w-]+(?:\.[\w-]+)+$").unwrap());

/// Rule-based English tagger.
///
/// Construction loads the stopword list once; tagging itself allocates only
/// the output tokens.
#[derive(Debug, Clone)]
pub struct RuleTagger {
    stopwords: HashSet<String>,
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTagger {
    /// English tagger with the NLTK stopword list.
    ///
    /// The NLTK list holds only function words. Larger lists (stopwords-iso)
    /// include `research`, `system` and `results`, which this tool is meant
    /// to count.
    pub fn new() -> Self {
        Self::with_stopwords(get(LANGUAGE::English).iter().map(|s| s.to_string()))
    }

    /// English tagger with a caller-supplied stopword list (case-insensitive).
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    fn annotate(&self, text: &str, sentence_start: bool) -> Token {
        let lower = text.to_lowercase();
        let is_space = text.chars().all(char::is_whitespace);
        let is_symbol = !is_space && text.chars().all(|c| SYMBOL_CHARS.contains(c));
        let is_punct = !is_space && !is_symbol && text.chars().all(is_punctuation);
        let like_url = RE_URL.is_match(text);
        let like_email = !like_url && RE_EMAIL.is_match(text);
        let is_title = is_titlecase(text);
        let possessive = is_possessive_marker(text);
        let is_stop = possessive || self.stopwords.contains(&lower);

        let (pos, fine_tag, lemma) = if is_space {
            (Pos::Space, "_SP", lower.clone())
        } else if is_punct {
            (Pos::Punct, punct_tag(text), text.to_string())
        } else if is_symbol {
            (Pos::Sym, "SYM", text.to_string())
        } else if like_url || like_email {
            (Pos::X, "ADD", lower.clone())
        } else if possessive {
            (Pos::Part, "POS", lower.clone())
        } else if RE_NUMERIC.is_match(text) || NUMBER_WORDS.contains(&lower.as_str()) {
            (Pos::Num, "CD", lower.clone())
        } else if AUXILIARIES.contains(&lower.as_str()) {
            let tag = if MODALS.contains(&lower.as_str()) {
                "MD"
            } else {
                "VB"
            };
            (Pos::Aux, tag, lower.clone())
        } else if ADPOSITIONS.contains(&lower.as_str()) {
            (Pos::Adp, "IN", lower.clone())
        } else if DETERMINERS.contains(&lower.as_str()) {
            (Pos::Det, "DT", lower.clone())
        } else if PRONOUNS.contains(&lower.as_str()) {
            (Pos::Pron, "PRP", lower.clone())
        } else if COORDINATORS.contains(&lower.as_str()) {
            (Pos::Cconj, "CC", lower.clone())
        } else if SUBORDINATORS.contains(&lower.as_str()) {
            (Pos::Sconj, "IN", lower.clone())
        } else if !sentence_start && !is_stop && (is_title || is_acronym(text)) {
            if is_title && looks_plural(&lower) {
                (Pos::Propn, "NNPS", singularize(text))
            } else {
                (Pos::Propn, "NNP", text.to_string())
            }
        } else {
            classify_open_class(&lower)
        };

        Token {
            text: text.to_string(),
            lemma,
            pos,
            fine_tag: fine_tag.to_string(),
            is_stop,
            is_punct,
            is_space,
            like_url,
            like_email,
            is_title,
        }
    }
}

impl Tagger for RuleTagger {
    fn tag(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for chunk in split_whitespace_runs(text) {
            if chunk.chars().all(char::is_whitespace) {
                // A single separating space is not a token.
                if chunk != " " {
                    tokens.push(self.annotate(chunk, sentence_start));
                }
                continue;
            }

            // URLs and e-mail addresses stay whole; word segmentation would
            // shred them at every `.` and `/`.
            let core = chunk.trim_end_matches(|c: char| ".,;:)]}\"'".contains(c));
            if !core.is_empty() && (RE_URL.is_match(core) || RE_EMAIL.is_match(core)) {
                tokens.push(self.annotate(core, sentence_start));
                sentence_start = false;
                for piece in chunk[core.len()..].split_word_bounds() {
                    tokens.push(self.annotate(piece, sentence_start));
                    sentence_start = ends_sentence(piece);
                }
                continue;
            }

            // Word segmentation keeps `encoder's` whole; the clitic becomes
            // its own token.
            let pieces = chunk.split_word_bounds().flat_map(|piece| {
                match split_possessive(piece) {
                    Some((stem, marker)) => [Some(stem), Some(marker)],
                    None => [Some(piece), None],
                }
                .into_iter()
                .flatten()
            });

            for piece in pieces {
                tokens.push(self.annotate(piece, sentence_start));
                if ends_sentence(piece) {
                    sentence_start = true;
                } else if !piece.chars().all(is_punctuation) {
                    sentence_start = false;
                }
            }
        }

        tokens
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────

/// Split into alternating runs of whitespace and non-whitespace.
fn split_whitespace_runs(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let ws = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|&(_, c)| c.is_whitespace() != ws)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(run)
    })
}

fn ends_sentence(piece: &str) -> bool {
    matches!(piece, "." | "!" | "?")
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '‘' | '’' | '‚' | '“' | '”' | '„' | '–' | '—' | '―' | '…' | '«' | '»' | '‹' | '›'
                | '¡' | '¿' | '§' | '¶' | '†' | '‡' | '′' | '″'
        )
}

fn punct_tag(text: &str) -> &'static str {
    match text {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "..." | "…" => ":",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "-" | "–" | "—" => "HYPH",
        "\"" | "“" | "”" | "'" | "‘" | "’" => "''",
        _ => "NFP",
    }
}

/// `str.istitle()` semantics for a single word: first cased character
/// uppercase, every following cased character lowercase.
fn is_titlecase(text: &str) -> bool {
    let mut cased = text.chars().filter(|c| c.is_uppercase() || c.is_lowercase());
    match cased.next() {
        Some(first) if first.is_uppercase() => cased.all(char::is_lowercase),
        _ => false,
    }
}

/// All-caps word of two or more letters, e.g. `DNA`, `GPU`.
fn is_acronym(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && text.chars().all(|c| !c.is_lowercase())
        && text.chars().any(char::is_uppercase)
}

const POSSESSIVE_MARKERS: [&str; 4] = ["'s", "'S", "’s", "’S"];

fn is_possessive_marker(text: &str) -> bool {
    POSSESSIVE_MARKERS.contains(&text)
}

/// Split `encoder's` into `("encoder", "'s")`.
fn split_possessive(piece: &str) -> Option<(&str, &str)> {
    POSSESSIVE_MARKERS.iter().find_map(|marker| {
        let stem = piece.strip_suffix(marker)?;
        stem.chars()
            .any(char::is_alphanumeric)
            .then(|| (stem, &piece[stem.len()..]))
    })
}

fn looks_plural(lower: &str) -> bool {
    lower.chars().count() > 3
        && lower.ends_with('s')
        && !["ss", "us", "is", "ous", "sis", "ics"]
            .iter()
            .any(|suffix| lower.ends_with(suffix))
}

/// Singularise a regular English plural, preserving the word's case.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.len() > 4 && lower.ends_with("ies") {
        let stem = &word[..word.len() - 3];
        let y = if word.ends_with("IES") { "Y" } else { "y" };
        return format!("{stem}{y}");
    }
    if ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return word[..word.len() - 2].to_string();
    }
    if lower.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Assign POS, Penn tag, and lemma to a lowercase open-class word.
fn classify_open_class(lower: &str) -> (Pos, &'static str, String) {
    let len = lower.chars().count();
    if !lower.chars().any(char::is_alphanumeric) {
        return (Pos::X, "XX", lower.to_string());
    }
    if len > 4 && lower.ends_with("ly") {
        return (Pos::Adv, "RB", lower.to_string());
    }
    if len > 5 && lower.ends_with("ing") {
        return (Pos::Verb, "VBG", lower.to_string());
    }
    if len > 4 && lower.ends_with("ed") {
        return (Pos::Verb, "VBD", lower.to_string());
    }
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return (Pos::Adj, "JJ", lower.to_string());
    }
    if looks_plural(lower) {
        return (Pos::Noun, "NNS", singularize(lower));
    }
    (Pos::Noun, "NN", lower.to_string())
}
