//! Token annotations coming out of a classifier and the entity spans built from them.

use serde::{Deserialize, Serialize};

use crate::{NerError, Result};

/// One classifier label over a sub-span of a sentence.
///
/// `start`/`end` are byte offsets into the sentence the classifier was fed.
/// The same shape is reused for the intermediate spans produced by word-piece
/// merging and tag resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAnnotation {
    pub tag: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TokenAnnotation {
    pub fn new(tag: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            start,
            end,
            text: text.into(),
        }
    }
}

/// A merged, offset-exact entity occurrence within one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Always `sentence[start..end]`.
    pub text: String,
    /// Entity type with any tag-scheme prefix stripped.
    pub category: String,
    pub start: usize,
    pub end: usize,
    pub source_model: String,
    pub sentence_index: usize,
}

impl EntitySpan {
    /// Build a span that has not yet been stamped with provenance.
    pub fn unstamped(text: impl Into<String>, category: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            start,
            end,
            source_model: String::new(),
            sentence_index: 0,
        }
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<TokenAnnotation> for EntitySpan {
    fn from(ann: TokenAnnotation) -> Self {
        EntitySpan::unstamped(ann.text, ann.tag, ann.start, ann.end)
    }
}

/// Slice `sentence[start..end]`, rejecting empty, out-of-range or non-char-boundary spans.
pub(crate) fn slice_sentence(sentence: &str, start: usize, end: usize) -> Result<&str> {
    if start >= end {
        return Err(NerError::InvalidSpan { start, end, len: sentence.len() });
    }
    sentence.get(start..end).ok_or(NerError::InvalidSpan {
        start,
        end,
        len: sentence.len(),
    })
}
