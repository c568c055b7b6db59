//! Document parsing and queries over the parsed result.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::entity::EntitySpan;
use crate::pipeline::Parser;
use crate::report::RenderInput;
use crate::segment::{segment, LineSplitter, SentenceSplitter};
use crate::{NerError, Result};

/// Raw note text, or text the caller has already split into sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentInput {
    Text(String),
    Sentences(Vec<String>),
}

impl From<&str> for DocumentInput {
    fn from(text: &str) -> Self {
        DocumentInput::Text(text.to_string())
    }
}

impl From<String> for DocumentInput {
    fn from(text: String) -> Self {
        DocumentInput::Text(text)
    }
}

impl From<Vec<String>> for DocumentInput {
    fn from(sentences: Vec<String>) -> Self {
        DocumentInput::Sentences(sentences)
    }
}

impl From<Vec<&str>> for DocumentInput {
    fn from(sentences: Vec<&str>) -> Self {
        DocumentInput::Sentences(sentences.into_iter().map(str::to_string).collect())
    }
}

/// Result of one parse pass.
///
/// `entities` and `sections` are index-aligned with `sentences`; entity
/// offsets are relative to their own sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub sentences: Vec<String>,
    pub entities: Vec<Vec<EntitySpan>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
    pub original_text: DocumentInput,
    pub filepath: Option<PathBuf>,
}

/// Sentences sharing one section label, with their entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGroup {
    pub label: String,
    pub sentences: Vec<String>,
    pub entities: Vec<EntitySpan>,
}

impl ParsedDocument {
    /// All entities in sentence order, optionally only those from one model.
    pub fn entities(&self, from_model: Option<&str>) -> Vec<&EntitySpan> {
        self.entities
            .iter()
            .flatten()
            .filter(|e| from_model.map_or(true, |m| e.source_model == m))
            .collect()
    }

    /// Group sentences by section label, in order of first appearance.
    pub fn entities_by_section(&self) -> Result<Vec<SectionGroup>> {
        let sections = self.sections.as_ref().ok_or(NerError::SectionsNotEnabled)?;

        let mut groups: Vec<SectionGroup> = Vec::new();
        for ((label, sentence), entities) in sections.iter().zip(&self.sentences).zip(&self.entities) {
            let idx = match groups.iter().position(|g| &g.label == label) {
                Some(idx) => idx,
                None => {
                    groups.push(SectionGroup {
                        label: label.clone(),
                        sentences: Vec::new(),
                        entities: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            groups[idx].sentences.push(sentence.clone());
            groups[idx].entities.extend(entities.iter().cloned());
        }

        Ok(groups)
    }

    /// Case-insensitive substring search over entity texts.
    ///
    /// With `match_all` every keyword must occur in some entity, otherwise
    /// any one keyword is enough. No keywords or no entities never match.
    pub fn keyword_search<S: AsRef<str>>(&self, keywords: &[S], match_all: bool) -> bool {
        let texts: Vec<String> = self
            .entities
            .iter()
            .flatten()
            .map(|e| e.text.to_lowercase())
            .collect();
        if keywords.is_empty() || texts.is_empty() {
            return false;
        }

        let found = |keyword: &S| {
            let keyword = keyword.as_ref().to_lowercase();
            texts.iter().any(|t| t.contains(&keyword))
        };
        if match_all {
            keywords.iter().all(found)
        } else {
            keywords.iter().any(found)
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.iter().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A clinical note bound to a parser.
///
/// Created unparsed; [`Document::parse`] fills it in one pass and a second
/// call replaces the previous result.
#[derive(Debug)]
pub struct Document<'p> {
    input: DocumentInput,
    filepath: Option<PathBuf>,
    parser: &'p Parser,
    parsed: Option<ParsedDocument>,
}

impl<'p> Document<'p> {
    pub fn new(input: impl Into<DocumentInput>, parser: &'p Parser) -> Self {
        let input = input.into();
        if matches!(input, DocumentInput::Sentences(_)) && !parser.config().sent_per_line {
            warn!(
                "Parser `sent_per_line` is false but a sentence list was passed; \
                 assuming one element per sentence. Pass raw text to use the sentence splitter."
            );
        }
        Self {
            input,
            filepath: None,
            parser,
            parsed: None,
        }
    }

    /// Load a `.txt` note. With `sent_per_line` each non-blank line is a sentence.
    pub fn from_file(path: impl AsRef<Path>, parser: &'p Parser) -> Result<Self> {
        let path = path.as_ref();
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if !is_txt {
            return Err(NerError::InvalidInput(format!(
                "Input file must be a .txt file: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let input = if parser.config().sent_per_line {
            DocumentInput::Sentences(LineSplitter.split(&content))
        } else {
            DocumentInput::Text(content)
        };

        Ok(Self {
            input,
            filepath: Some(path.to_path_buf()),
            parser,
            parsed: None,
        })
    }

    pub fn input(&self) -> &DocumentInput {
        &self.input
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Segment, tag sections, and run every model over every sentence.
    pub fn parse(&mut self) -> Result<&ParsedDocument> {
        let parser = self.parser;
        let sentences = segment(&self.input, parser.splitter());
        info!(
            "Parsing {} sentences with {} models",
            sentences.len(),
            parser.models().len()
        );

        let sections = parser.section_tagger().map(|tagger| tagger.tag(&sentences));

        let mut entities: Vec<Vec<EntitySpan>> = vec![Vec::new(); sentences.len()];
        for (name, model) in parser.models().iter() {
            let model_entities = parser.ner_document(name, model, &sentences)?;
            if model_entities.len() != entities.len() {
                return Err(NerError::AlignmentMismatch {
                    model: name.to_string(),
                    expected: entities.len(),
                    actual: model_entities.len(),
                });
            }
            for (acc, found) in entities.iter_mut().zip(model_entities) {
                acc.extend(found);
            }
        }

        let parsed = ParsedDocument {
            sentences,
            entities,
            sections,
            original_text: self.input.clone(),
            filepath: self.filepath.clone(),
        };
        info!(
            "Parsed {} sentences, {} entities",
            parsed.sentences.len(),
            parsed.entity_count()
        );

        Ok(self.parsed.insert(parsed))
    }

    pub fn parsed(&self) -> Option<&ParsedDocument> {
        self.parsed.as_ref()
    }

    /// Empty until the document is parsed.
    pub fn entities(&self, from_model: Option<&str>) -> Vec<&EntitySpan> {
        self.parsed
            .as_ref()
            .map(|p| p.entities(from_model))
            .unwrap_or_default()
    }

    pub fn entities_by_section(&self) -> Result<Vec<SectionGroup>> {
        if self.parser.section_tagger().is_none() {
            return Err(NerError::SectionsNotEnabled);
        }
        self.parsed.as_ref().ok_or(NerError::NotParsed)?.entities_by_section()
    }

    pub fn keyword_search<S: AsRef<str>>(&self, keywords: &[S], match_all: bool) -> bool {
        self.parsed
            .as_ref()
            .is_some_and(|p| p.keyword_search(keywords, match_all))
    }

    /// Document-level spans for a renderer.
    pub fn render_input(&self) -> Result<RenderInput> {
        let parsed = self.parsed.as_ref().ok_or(NerError::NotParsed)?;
        Ok(RenderInput::from_parsed(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(sections: Option<Vec<&str>>) -> ParsedDocument {
        let mut first = EntitySpan::unstamped("chest pain", "PROBLEM", 0, 10);
        first.source_model = "clinical".to_string();
        let mut second = EntitySpan::unstamped("aspirin", "M", 9, 16);
        second.source_model = "medication".to_string();
        second.sentence_index = 1;
        let mut third = EntitySpan::unstamped("ECG", "TEST", 0, 3);
        third.source_model = "clinical".to_string();
        third.sentence_index = 2;

        ParsedDocument {
            sentences: vec![
                "chest pain today".to_string(),
                "continue aspirin".to_string(),
                "ECG normal".to_string(),
            ],
            entities: vec![vec![first], vec![second], vec![third]],
            sections: sections.map(|s| s.into_iter().map(str::to_string).collect()),
            original_text: DocumentInput::Text(String::new()),
            filepath: None,
        }
    }

    #[test]
    fn test_entities_flatten_and_filter_by_model() {
        let doc = parsed(None);
        assert_eq!(doc.entities(None).len(), 3);
        let clinical: Vec<&str> = doc.entities(Some("clinical")).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(clinical, vec!["chest pain", "ECG"]);
        assert!(doc.entities(Some("absent")).is_empty());
    }

    #[test]
    fn test_entities_by_section_requires_sections() {
        assert!(matches!(parsed(None).entities_by_section(), Err(NerError::SectionsNotEnabled)));
    }

    #[test]
    fn test_entities_by_section_groups_in_first_seen_order() {
        let doc = parsed(Some(vec!["HPI:", "PLAN:", "HPI:"]));
        let groups = doc.entities_by_section().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "HPI:");
        assert_eq!(groups[0].sentences, vec!["chest pain today", "ECG normal"]);
        assert_eq!(groups[0].entities.len(), 2);
        assert_eq!(groups[1].label, "PLAN:");
        assert_eq!(groups[1].entities[0].text, "aspirin");
    }

    #[test]
    fn test_keyword_search_any_and_all() {
        let doc = parsed(None);
        assert!(doc.keyword_search(&["PAIN"], false));
        assert!(doc.keyword_search(&["pain", "insulin"], false));
        assert!(!doc.keyword_search(&["pain", "insulin"], true));
        assert!(doc.keyword_search(&["pain", "Aspirin", "ecg"], true));
        assert!(!doc.keyword_search(&["insulin"], false));
    }

    #[test]
    fn test_keyword_search_empty_inputs() {
        let doc = parsed(None);
        assert!(!doc.keyword_search::<&str>(&[], false));
        assert!(!doc.keyword_search::<&str>(&[], true));

        let mut empty = parsed(None);
        empty.entities = vec![Vec::new(); 3];
        assert!(!empty.keyword_search(&["pain"], false));
    }

    #[test]
    fn test_json_omits_missing_sections() {
        let json = parsed(None).to_json().unwrap();
        assert!(!json.contains("\"sections\""));
        assert!(json.contains("\"source_model\": \"medication\""));
    }
}
