//! Word-piece normalization.
//!
//! Sub-word tokenizers split one word into fragments whose byte ranges touch
//! (`a.end == b.start`). Merging on offsets alone undoes that split without
//! caring how the tokenizer marks continuation pieces (`##`, `▁`, ...).

use tracing::debug;

use crate::entity::{slice_sentence, TokenAnnotation};
use crate::Result;

/// Collapse runs of contiguous tokens into whole-word spans.
///
/// Each run keeps the tag of its first token. The merged `text` is re-sliced
/// from `sentence`, never concatenated from fragment texts.
pub fn merge_wordpieces(tokens: &[TokenAnnotation], sentence: &str) -> Result<Vec<TokenAnnotation>> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let first = &tokens[i];
        let mut end = first.end;
        let mut j = i + 1;
        while j < tokens.len() && tokens[j].start == end {
            end = tokens[j].end;
            j += 1;
        }

        let text = slice_sentence(sentence, first.start, end)?;
        merged.push(TokenAnnotation::new(first.tag.clone(), first.start, end, text));
        i = j;
    }

    debug!("word-piece merge: {} tokens -> {} spans", tokens.len(), merged.len());
    Ok(merged)
}
