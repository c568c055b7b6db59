//! Clinical Named Entity Recognition post-processing.
//!
//! Turns raw token-classification output (word-piece fragments carrying
//! IOB tags) into whole entity spans with exact character offsets, and
//! organises them per sentence and per section of a clinical note.
//!
//! The model itself is an external collaborator behind [`TokenClassifier`];
//! a candle-backed BERT classifier is available with the `bert` feature.

mod classifier;
mod config;
mod document;
mod entity;
mod entity_types;
mod filter;
mod pipeline;
mod report;
mod sections;
mod segment;
mod tag_scheme;
mod wordpiece;

#[cfg(feature = "bert")]
mod ner_model;


pub use classifier::{ModelRegistry, TokenClassifier};
pub use config::{ModelSpec, ParserConfig};
pub use document::{Document, DocumentInput, ParsedDocument, SectionGroup};
pub use entity::{EntitySpan, TokenAnnotation};
pub use entity_types::{normalize_entity_label, ClinicalCategory};
pub use filter::EntityFilter;
pub use pipeline::Parser;
pub use report::{RenderInput, RenderSpan};
pub use sections::{SectionTagger, NO_SECTION};
pub use segment::{segment, splitter_by_name, LineSplitter, RuleSplitter, SentenceSplitter};
pub use tag_scheme::{decompose_tag, resolve_tags, TagPrefix};
pub use wordpiece::merge_wordpieces;

#[cfg(feature = "bert")]
pub use ner_model::BertTokenClassifier;

pub type Result<T> = std::result::Result<T, NerError>;

#[derive(Debug, thiserror::Error)]
pub enum NerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Section headers not parsed; enable `extract_section_headers` in the parser config")]
    SectionsNotEnabled,

    #[error("Document has not been parsed yet")]
    NotParsed,

    #[error("Model '{model}' returned {actual} sentence entity lists, expected {expected}")]
    AlignmentMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid span {start}..{end} for sentence of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token classifier failed: {0}")]
    Classifier(String),

    #[cfg(feature = "bert")]
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[cfg(feature = "bert")]
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[cfg(feature = "bert")]
    #[error("Inference failed: {0}")]
    Inference(String),

    #[cfg(feature = "bert")]
    #[error("Download failed: {0}")]
    Download(String),
}

#[cfg(feature = "bert")]
impl From<candle_core::Error> for NerError {
    fn from(e: candle_core::Error) -> Self {
        NerError::Inference(e.to_string())
    }
}
