//! Input for entity renderers.
//!
//! Renderers work on one flat text, so sentence-relative entity offsets are
//! shifted onto the sentences joined with single spaces.

use serde::Serialize;

use crate::document::ParsedDocument;
use crate::entity_types::{normalize_entity_label, ClinicalCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpan {
    /// Byte offset into [`RenderInput::text`].
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub kind: ClinicalCategory,
    pub color: String,
    pub source_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInput {
    pub text: String,
    pub spans: Vec<RenderSpan>,
}

impl RenderInput {
    pub fn from_parsed(parsed: &ParsedDocument) -> Self {
        let mut spans = Vec::new();
        let mut offset = 0;

        for (sentence, entities) in parsed.sentences.iter().zip(&parsed.entities) {
            for entity in entities {
                let kind = normalize_entity_label(&entity.category);
                spans.push(RenderSpan {
                    start: entity.start + offset,
                    end: entity.end + offset,
                    label: entity.category.clone(),
                    kind,
                    color: kind.color().to_string(),
                    source_model: entity.source_model.clone(),
                });
            }
            offset += sentence.len() + 1;
        }

        Self {
            text: parsed.sentences.join(" "),
            spans,
        }
    }

    /// Distinct labels with their colours, in order of first use.
    pub fn legend(&self) -> Vec<(&str, &str)> {
        let mut legend: Vec<(&str, &str)> = Vec::new();
        for span in &self.spans {
            if !legend.iter().any(|(label, _)| *label == span.label) {
                legend.push((span.label.as_str(), span.color.as_str()));
            }
        }
        legend
    }

    pub fn span_text(&self, span: &RenderSpan) -> &str {
        &self.text[span.start..span.end]
    }
}
