//! Sentence segmentation.
//!
//! Sentences are handed to the token classifier verbatim and every entity
//! offset is relative to them, so splitters only cut: they never rewrite
//! casing or whitespace inside a sentence.

use std::collections::HashSet;

use crate::document::DocumentInput;
use crate::{NerError, Result};

/// Splits raw text into an ordered list of sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Pre-segmented input passes through untouched; raw text goes to `splitter`.
pub fn segment(input: &DocumentInput, splitter: &dyn SentenceSplitter) -> Vec<String> {
    match input {
        DocumentInput::Sentences(sentences) => sentences.clone(),
        DocumentInput::Text(text) => splitter.split(text),
    }
}

/// Look up a built-in splitter by name.
pub fn splitter_by_name(name: &str) -> Result<Box<dyn SentenceSplitter>> {
    match name {
        "rule" | "default" => Ok(Box::new(RuleSplitter::default())),
        "line" => Ok(Box::new(LineSplitter)),
        other => Err(NerError::Config(format!(
            "Unknown sentence splitter '{}'; supported: rule, line",
            other
        ))),
    }
}

/// One sentence per non-blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineSplitter;

impl SentenceSplitter for LineSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

const CLINICAL_ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "pt", "vs", "no", "st", "approx", "hx", "dx", "rx", "sx", "tx",
    "e.g", "i.e", "a.m", "p.m", "b.i.d", "t.i.d", "q.i.d", "q.d", "p.o", "p.r.n", "h.s", "q.h.s",
    "mg", "mcg", "ml", "min", "hr", "hrs", "wk", "wks", "yr", "yrs", "y.o",
];

/// Punctuation-based splitter tuned for clinical prose.
///
/// Breaks after `.`, `!` or `?` when whitespace follows and the next word
/// starts with an upper-case letter or a digit, and at blank lines. A period
/// after a known abbreviation or a single-letter initial does not break.
#[derive(Debug, Clone)]
pub struct RuleSplitter {
    abbreviations: HashSet<String>,
}

impl Default for RuleSplitter {
    fn default() -> Self {
        Self::with_abbreviations(CLINICAL_ABBREVIATIONS.iter().copied())
    }
}

impl RuleSplitter {
    pub fn with_abbreviations<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| a.as_ref().trim_end_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether the word right before a period is an abbreviation.
    fn ends_with_abbreviation(&self, before: &str) -> bool {
        let word = before
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            return false;
        }
        let mut chars = word.chars();
        let single_initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic());
        single_initial || self.abbreviations.contains(&word.to_lowercase())
    }
}

impl SentenceSplitter for RuleSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut push = |piece: &str| {
            let piece = piece.trim();
            if !piece.is_empty() {
                sentences.push(piece.to_string());
            }
        };

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut start = 0;

        for (k, &(idx, ch)) in chars.iter().enumerate() {
            match ch {
                '\n' => {
                    let rest = chars[k + 1..].iter().map(|&(_, c)| c);
                    let blank_line = rest
                        .take_while(|c| c.is_whitespace())
                        .any(|c| c == '\n');
                    if blank_line {
                        push(&text[start..idx]);
                        start = idx + 1;
                    }
                }
                '.' | '!' | '?' => {
                    let followed_by_space = chars.get(k + 1).is_some_and(|&(_, c)| c.is_whitespace());
                    if !followed_by_space {
                        continue;
                    }
                    let next_word = chars[k + 1..].iter().map(|&(_, c)| c).find(|c| !c.is_whitespace());
                    let starts_sentence = match next_word {
                        Some(c) => c.is_uppercase() || c.is_ascii_digit(),
                        None => true,
                    };
                    if !starts_sentence {
                        continue;
                    }
                    if ch == '.' && self.ends_with_abbreviation(&text[start..idx]) {
                        continue;
                    }
                    let end = idx + ch.len_utf8();
                    push(&text[start..end]);
                    start = end;
                }
                _ => {}
            }
        }
        push(&text[start..]);

        sentences
    }
}
