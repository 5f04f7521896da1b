//! Token filter: decide, token by token, which words enter the tally.
//!
//! The policy is tuned for academic PDFs. It throws away stopwords,
//! punctuation, page furniture, numerals, author initials, URLs, proper
//! nouns, and the `et al.` citation abbreviation, then normalises what is
//! left (plural nouns → lemma, proper nouns verbatim, everything else
//! lowercased).
//!
//! ## Rule order
//!
//! The first matching rule decides:
//!
//! 1. suppressed by a preceding `et` (see rule 6)
//! 2. stopword, punctuation, whitespace, or a single character
//! 3. URL, e-mail, title-case, or POS in {AUX, ADP, SYM, NUM, PROPN}
//! 4. digits, a decimal numeral, or an initial such as `J.`
//! 5. leading `|` or `.`
//! 6. `et` immediately followed by `al`: drop, and suppress the next token
//! 7. keep, normalised
//!
//! The only state carried between tokens is [`FilterState`], so the filter
//! is an explicit two-state machine over an index-addressable slice.

use crate::pipeline::tagger::{Pos, Token};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.?\d*$").unwrap());

const DROPPED_POS: [Pos; 5] = [Pos::Aux, Pos::Adp, Pos::Sym, Pos::Num, Pos::Propn];

/// State carried from one token to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Normal,
    /// The previous token was the `et` of `et al`; drop the next one.
    SuppressNext,
}

/// Outcome for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep(String),
    Drop,
    /// Drop this token and the one after it.
    DropAndSuppressNext,
}

/// Classify `token` given the token that follows it (if any).
///
/// Does not consult [`FilterState`]; suppression (rule 1) is applied by
/// [`TokenFilter`] before this is called.
pub fn classify(token: &Token, next: Option<&Token>) -> Decision {
    let text = token.text.as_str();

    if token.is_stop || token.is_punct || token.is_space || text.chars().count() == 1 {
        return Decision::Drop;
    }

    if token.like_url || token.like_email || token.is_title || DROPPED_POS.contains(&token.pos) {
        return Decision::Drop;
    }

    if is_all_digits(text) || RE_NUMERAL.is_match(text) || looks_like_initial(text) {
        return Decision::Drop;
    }

    if text.starts_with('|') || text.starts_with('.') {
        return Decision::Drop;
    }

    if text.to_lowercase() == "et" {
        if let Some(next) = next {
            if next.text.to_lowercase() == "al" {
                return Decision::DropAndSuppressNext;
            }
        }
    }

    Decision::Keep(normalize(token))
}

/// Map a surviving token to the word that is counted.
pub fn normalize(token: &Token) -> String {
    match token.fine_tag.as_str() {
        "NNS" | "NNPS" => token.lemma.clone(),
        "NNP" => token.text.clone(),
        _ => token.text.to_lowercase(),
    }
}

/// Lazy filter over a token slice, yielding normalised words in order.
///
/// Single forward pass; to re-run, build a new filter from the start of the
/// slice.
#[derive(Debug, Clone)]
pub struct TokenFilter<'a> {
    tokens: &'a [Token],
    pos: usize,
    state: FilterState,
}

impl<'a> TokenFilter<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            state: FilterState::Normal,
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }
}

impl<'a> Iterator for TokenFilter<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.pos < self.tokens.len() {
            let i = self.pos;
            self.pos += 1;

            if self.state == FilterState::SuppressNext {
                self.state = FilterState::Normal;
                continue;
            }

            match classify(&self.tokens[i], self.tokens.get(i + 1)) {
                Decision::Keep(word) => return Some(word),
                Decision::Drop => {}
                Decision::DropAndSuppressNext => self.state = FilterState::SuppressNext,
            }
        }
        None
    }
}

/// Filter a whole token slice eagerly.
pub fn filter_tokens(tokens: &[Token]) -> Vec<String> {
    TokenFilter::new(tokens).collect()
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_numeric)
}

/// `J.`, `A.B.`, `JR.`: everything before the final `.` has at least one
/// cased character and none of them lowercase.
fn looks_like_initial(text: &str) -> bool {
    let Some(head) = text.strip_suffix('.') else {
        return false;
    };
    head.chars().any(char::is_uppercase) && !head.chars().any(char::is_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(texts: &[&str]) -> Vec<Token> {
        texts.iter().map(|t| Token::word(t)).collect()
    }

    fn punct(text: &str) -> Token {
        Token {
            is_punct: true,
            pos: Pos::Punct,
            fine_tag: ".".into(),
            ..Token::word(text)
        }
    }

    #[test]
    fn citation_pair_collapses_to_nothing() {
        let tokens = vec![
            Token::word("et"),
            Token::word("al"),
            punct("."),
            Token::word("discovered"),
        ];
        assert_eq!(filter_tokens(&tokens), vec!["discovered"]);
    }

    #[test]
    fn citation_match_is_case_insensitive() {
        let tokens = words(&["Et", "AL", "findings"]);
        assert_eq!(filter_tokens(&tokens), vec!["findings"]);
    }

    #[test]
    fn trailing_et_is_kept() {
        let tokens = words(&["method", "et"]);
        assert_eq!(filter_tokens(&tokens), vec!["method", "et"]);
    }

    #[test]
    fn et_without_al_is_kept() {
        let tokens = words(&["et", "cetera"]);
        assert_eq!(filter_tokens(&tokens), vec!["et", "cetera"]);
    }

    #[test]
    fn suppression_ignores_the_suppressed_token_content() {
        // The token after `et` is dropped even when it would otherwise survive,
        // and the state returns to normal afterwards.
        let tokens = words(&["et", "al", "robust", "robust"]);
        let mut filter = TokenFilter::new(&tokens);
        assert_eq!(filter.next().as_deref(), Some("robust"));
        assert_eq!(filter.state(), FilterState::Normal);
        assert_eq!(filter.next().as_deref(), Some("robust"));
        assert_eq!(filter.next(), None);
    }

    #[test]
    fn structural_drops() {
        let stop = Token {
            is_stop: true,
            ..Token::word("the")
        };
        let space = Token {
            is_space: true,
            pos: Pos::Space,
            ..Token::word("\n\n")
        };
        let tokens = vec![stop, punct(";"), space, Token::word("x"), Token::word("ok")];
        assert_eq!(filter_tokens(&tokens), vec!["ok"]);
    }

    #[test]
    fn entity_and_pos_drops() {
        let url = Token {
            like_url: true,
            ..Token::word("arxiv.org")
        };
        let email = Token {
            like_email: true,
            ..Token::word("a@b.org")
        };
        let title = Token {
            is_title: true,
            ..Token::word("Figure")
        };
        let mut tokens = vec![url, email, title];
        for pos in DROPPED_POS {
            tokens.push(Token {
                pos,
                ..Token::word("dropped")
            });
        }
        tokens.push(Token::word("kept"));
        assert_eq!(filter_tokens(&tokens), vec!["kept"]);
    }

    #[test]
    fn numerals_and_initials_are_dropped() {
        let tokens = words(&["2023", "3.14", "12.", "J.", "AB.", "eq.", "layer"]);
        assert_eq!(filter_tokens(&tokens), vec!["eq.", "layer"]);
    }

    #[test]
    fn leading_pipe_or_dot_is_dropped() {
        let tokens = words(&["|x|", ".net", "norm"]);
        assert_eq!(filter_tokens(&tokens), vec!["norm"]);
    }

    #[test]
    fn normalization_by_fine_tag() {
        let plural = Token {
            fine_tag: "NNS".into(),
            lemma: "network".into(),
            ..Token::word("Networks")
        };
        let proper = Token {
            fine_tag: "NNP".into(),
            ..Token::word("BERT")
        };
        let plain = Token::word("Convolution");
        assert_eq!(normalize(&plural), "network");
        assert_eq!(normalize(&proper), "BERT");
        assert_eq!(normalize(&plain), "convolution");
    }

    #[test]
    fn single_dot_does_not_panic() {
        assert_eq!(classify(&Token::word("."), None), Decision::Drop);
        assert_eq!(classify(&Token::word(".."), None), Decision::Drop);
    }

    #[test]
    fn filter_is_lazy_and_restartable_from_scratch() {
        let tokens = words(&["alpha", "beta"]);
        let first: Vec<_> = TokenFilter::new(&tokens).collect();
        let second: Vec<_> = TokenFilter::new(&tokens).collect();
        assert_eq!(first, second);
    }
}
