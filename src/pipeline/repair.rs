//! Text repair: deterministic cleanup of PDF-extracted text before tagging.
//!
//! PDF text layers are full of artefacts that split or disguise words:
//!
//! - ligature glyphs (`ﬁ`, `ﬂ`, `ﬃ`) where the font used one
//! - mojibake from UTF-8 decoded as Windows-1252 (`â€™` for `’`)
//! - zero-width spaces, BOMs, and soft hyphens
//! - words hyphenated across a line break (`repre-\nsentation`)
//! - typographic quotes and dashes the tagger would treat as unknown symbols
//!
//! [`UnicodeRepairer`] applies six cheap rules in a fixed order. Each rule is
//! a pure `&str → String` function, so the whole repair is pure and total.
//!
//! ## Rule Order
//!
//! Mojibake must be undone before NFKC (the mis-decoded bytes are themselves
//! valid characters NFKC would happily keep), and invisible characters must
//! be gone before hyphen joining so `repre-\u{00AD}\nsentation` still joins.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Repairs extracted text before it is tagged.
pub trait Repairer: Send + Sync {
    fn repair(&self, text: &str) -> String;
}

/// The built-in repairer. See the module docs for the rule list.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeRepairer;

impl Repairer for UnicodeRepairer {
    fn repair(&self, text: &str) -> String {
        repair_text(text)
    }
}

/// Apply all repair rules in order:
///
/// 1. Normalise line endings (CRLF/CR → LF)
/// 2. Undo common UTF-8-as-Windows-1252 mojibake
/// 3. Strip invisible characters (zero-width, BOM, soft hyphen)
/// 4. NFKC compatibility normalisation (expands ligatures, full-width forms)
/// 5. Map typographic quotes and dashes to ASCII
/// 6. Re-join words hyphenated across line breaks
pub fn repair_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = fix_mojibake(&s);
    let s = remove_invisible_chars(&s);
    let s = compatibility_normalise(&s);
    let s = ascii_punctuation(&s);
    join_hyphenated_breaks(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Mojibake ─────────────────────────────────────────────────────────

/// UTF-8 sequences that were decoded as Windows-1252, longest first.
const MOJIBAKE: &[(&str, &str)] = &[
    ("ï¬\u{81}", "fi"),
    ("ï¬‚", "fl"),
    ("ï¬€", "ff"),
    ("ï¬ƒ", "ffi"),
    ("ï¬„", "ffl"),
    ("â€™", "\u{2019}"),
    ("â€˜", "\u{2018}"),
    ("â€œ", "\u{201C}"),
    ("â€\u{9D}", "\u{201D}"),
    ("â€“", "\u{2013}"),
    ("â€”", "\u{2014}"),
    ("â€¦", "\u{2026}"),
    ("â€¢", "\u{2022}"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã¶", "ö"),
    ("Ã¼", "ü"),
    ("Ã¤", "ä"),
    ("Ã§", "ç"),
    ("Ã±", "ñ"),
    ("Ã¡", "á"),
    ("Ã³", "ó"),
    ("Ã\u{AD}", "í"),
    ("Ãº", "ú"),
];

fn fix_mojibake(input: &str) -> String {
    if !input.contains('â') && !input.contains('Ã') && !input.contains('ï') {
        return input.to_string();
    }
    let mut s = input.to_string();
    for (bad, good) in MOJIBAKE {
        if s.contains(bad) {
            s = s.replace(bad, good);
        }
    }
    s
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: NFKC ─────────────────────────────────────────────────────────────

fn compatibility_normalise(input: &str) -> String {
    input.nfkc().collect()
}

// ── Rule 5: Typographic punctuation → ASCII ─────────────────────────────────

fn ascii_punctuation(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

// ── Rule 6: Join hyphenated line breaks ─────────────────────────────────────

static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").unwrap());

fn join_hyphenated_breaks(input: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(input, "$1$2").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ligatures_are_expanded() {
        assert_eq!(repair_text("e\u{FB03}cient \u{FB01}eld"), "efficient field");
    }

    #[test]
    fn mojibake_is_reversed() {
        assert_eq!(repair_text("the modelâ€™s caf\u{C3}\u{A9}"), "the model's café");
        assert_eq!(repair_text("deï¬\u{81}ne"), "define");
    }

    #[test]
    fn invisible_chars_are_removed() {
        assert_eq!(repair_text("\u{FEFF}atten\u{200B}tion"), "attention");
    }

    #[test]
    fn hyphenated_line_breaks_are_joined() {
        assert_eq!(repair_text("repre-\nsentation"), "representation");
        assert_eq!(repair_text("repre-\r\n  sentation"), "representation");
        assert_eq!(repair_text("repre\u{00AD}-\nsentation"), "representation");
    }

    #[test]
    fn capitalised_continuation_keeps_hyphen() {
        // `Hidden-\nMarkov` is a genuine compound, not a split word.
        assert_eq!(repair_text("Hidden-\nMarkov"), "Hidden-\nMarkov");
    }

    #[test]
    fn typographic_quotes_and_dashes_become_ascii() {
        assert_eq!(repair_text("“deep” – ‘wide’"), "\"deep\" - 'wide'");
    }

    #[test]
    fn repair_is_idempotent() {
        let once = repair_text("ﬁne-\ntuning â€œ ok");
        assert_eq!(repair_text(&once), once);
    }

    #[test]
    fn empty_input() {
        assert_eq!(repair_text(""), "");
    }

    #[test]
    fn repairer_trait_delegates() {
        assert_eq!(UnicodeRepairer.repair("\u{FB02}ow"), "flow");
    }
}
