//! Section labelling for structured clinical notes.

use regex::Regex;

use crate::{NerError, Result};

/// Label given to sentences before the first heading.
pub const NO_SECTION: &str = "NONE";

/// Default heading pattern: a line starting with words followed by a colon.
pub const DEFAULT_SECTION_HEADER_EXPR: &str = r"^[A-Za-z /]*:";

/// Assigns each sentence the most recent heading seen before or on it.
#[derive(Debug, Clone)]
pub struct SectionTagger {
    pattern: Regex,
}

impl SectionTagger {
    pub fn new(expr: &str) -> Result<Self> {
        let pattern = Regex::new(expr)
            .map_err(|e| NerError::Config(format!("Invalid section header expression '{}': {}", expr, e)))?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The heading text in `sentence`, if any. First match wins.
    pub fn heading<'a>(&self, sentence: &'a str) -> Option<&'a str> {
        self.pattern.find(sentence).map(|m| m.as_str())
    }

    /// One label per sentence; headings stick until the next one.
    pub fn tag<S: AsRef<str>>(&self, sentences: &[S]) -> Vec<String> {
        sentences
            .iter()
            .scan(NO_SECTION.to_string(), |current, sentence| {
                if let Some(heading) = self.heading(sentence.as_ref()) {
                    *current = heading.to_string();
                }
                Some(current.clone())
            })
            .collect()
    }
}

impl Default for SectionTagger {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_SECTION_HEADER_EXPR).expect("default section pattern is valid"),
        }
    }
}
