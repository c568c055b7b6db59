//! IOB tag-scheme resolution.
//!
//! Token classifiers label each word as `B-<TYPE>` (begins an entity),
//! `I-<TYPE>` (continues one) or a bare `<TYPE>`. This module joins the
//! continuation words onto the entity they belong to and strips the prefix.

use tracing::debug;

use crate::entity::{slice_sentence, TokenAnnotation};
use crate::Result;

/// Position marker carried in front of the entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPrefix {
    Begin,
    Inside,
    /// Any other marker (`E`, `S`, `L`, ...). Never starts a new entity on its own.
    Other(String),
}

impl TagPrefix {
    fn parse(marker: &str) -> Self {
        match marker {
            "B" | "b" => TagPrefix::Begin,
            "I" | "i" => TagPrefix::Inside,
            other => TagPrefix::Other(other.to_string()),
        }
    }
}

/// Split a tag into `(prefix, category)` at its first `-`.
///
/// Tags without a separator, or with an empty prefix or category, have no
/// prefix and the whole tag is the category.
pub fn decompose_tag(tag: &str) -> (Option<TagPrefix>, &str) {
    match tag.split_once('-') {
        Some((marker, category)) if !marker.is_empty() && !category.is_empty() => {
            (Some(TagPrefix::parse(marker)), category)
        }
        _ => (None, tag),
    }
}

/// Whether `tag` continues an open entity of type `category`.
fn continues(tag: &str, category: &str) -> bool {
    let (prefix, next_category) = decompose_tag(tag);
    prefix != Some(TagPrefix::Begin) && next_category == category
}

/// Merge consecutive spans of one entity and strip the scheme prefix.
///
/// A span absorbs the following spans while they are not `B-` tagged and
/// share its category. Absorbed texts are joined with a space; when
/// `sentence` is given the text is re-sliced from it afterwards, so the
/// result always equals `sentence[start..end]`.
pub fn resolve_tags(spans: &[TokenAnnotation], sentence: Option<&str>) -> Result<Vec<TokenAnnotation>> {
    let mut resolved = Vec::with_capacity(spans.len());
    let mut i = 0;

    while i < spans.len() {
        let (_, category) = decompose_tag(&spans[i].tag);
        let mut entity = TokenAnnotation::new(category, spans[i].start, spans[i].end, spans[i].text.clone());

        let mut j = i + 1;
        while j < spans.len() && continues(&spans[j].tag, category) {
            entity.end = spans[j].end;
            entity.text.push(' ');
            entity.text.push_str(&spans[j].text);
            j += 1;
        }

        if let Some(sentence) = sentence {
            entity.text = slice_sentence(sentence, entity.start, entity.end)?.to_string();
        }

        resolved.push(entity);
        i = j;
    }

    debug!("tag resolution: {} spans -> {} entities", spans.len(), resolved.len());
    Ok(resolved)
}
