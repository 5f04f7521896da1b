//! Pipeline stages for building a word impression from a PDF corpus.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ repair ──▶ tagger ──▶ filter ──▶ document
//! (dir)     (pdfium)    (NFKC)    (tokens)   (words)    (per-doc table)
//!
//! corpus table ──▶ customize ──▶ rank
//!                  (deny/rewrite)  (top N)
//! ```
//!
//! 1. [`input`]: list the `*.pdf` files of the corpus directory
//! 2. [`extract`]: concatenated page text via pdfium; runs in
//!    `spawn_blocking` because pdfium is synchronous
//! 3. [`repair`]: ligatures, mojibake, invisible characters, hyphenated
//!    line breaks
//! 4. [`tagger`]: split into tokens with POS tags, lemmas, and flags
//! 5. [`filter`]: drop noise tokens and normalise the rest
//! 6. [`document`]: ties 2–5 together for one document
//! 7. [`customize`] and [`rank`]: run on the merged corpus table

pub mod customize;
pub mod document;
pub mod extract;
pub mod filter;
pub mod input;
pub mod rank;
pub mod repair;
pub mod tagger;
