//! Parser configuration.
//!
//! Can be built in code or loaded from TOML / YAML, e.g.
//!
//! ```toml
//! include_ents = ["problem", "m", "do"]
//! extract_section_headers = true
//!
//! [[models]]
//! name = "clinical"
//! model_id = "samrawal/bert-base-uncased_clinical-ner"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::EntityFilter;
use crate::sections::{SectionTagger, DEFAULT_SECTION_HEADER_EXPR};
use crate::{NerError, Result};

/// A named token-classification checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub model_id: String,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_id: model_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Keep only these categories (case-insensitive). Wins over `exclude_ents`.
    #[serde(default)]
    pub include_ents: Vec<String>,

    /// Drop these categories (case-insensitive).
    #[serde(default)]
    pub exclude_ents: Vec<String>,

    /// Join IOB continuation tokens and strip `B-`/`I-` prefixes.
    #[serde(default = "default_true")]
    pub iob_resolve: bool,

    /// Name of the sentence splitter for raw text input.
    #[serde(default = "default_sent_tokenizer")]
    pub sent_tokenizer: String,

    /// Treat each line of an input file as one sentence.
    #[serde(default)]
    pub sent_per_line: bool,

    #[serde(default)]
    pub extract_section_headers: bool,

    #[serde(default = "default_section_header_expr")]
    pub section_header_expr: String,

    /// Maximum model sequence length (tokens).
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default = "default_true")]
    pub use_gpu: bool,

    /// Models run over every sentence, in this order.
    #[serde(default = "default_models")]
    pub models: Vec<ModelSpec>,
}

fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("clinical", "samrawal/bert-base-uncased_clinical-ner"),
        ModelSpec::new("medication", "samrawal/bert-large-uncased_med-ner"),
    ]
}
fn default_true() -> bool { true }
fn default_sent_tokenizer() -> String { "rule".to_string() }
fn default_section_header_expr() -> String { DEFAULT_SECTION_HEADER_EXPR.to_string() }
fn default_max_length() -> usize { 512 }

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            include_ents: Vec::new(),
            exclude_ents: Vec::new(),
            iob_resolve: true,
            sent_tokenizer: default_sent_tokenizer(),
            sent_per_line: false,
            extract_section_headers: false,
            section_header_expr: default_section_header_expr(),
            max_length: default_max_length(),
            use_gpu: true,
            models: default_models(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| NerError::Config(format!("Parse TOML config: {}", e)))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| NerError::Config(format!("Parse YAML config: {}", e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| NerError::Config(format!("Serialize config: {}", e)))
    }

    /// Build the category filter; warns if both lists are set.
    pub fn entity_filter(&self) -> EntityFilter {
        EntityFilter::new(&self.include_ents, &self.exclude_ents)
    }

    /// The section tagger, when section extraction is enabled.
    pub fn section_tagger(&self) -> Result<Option<SectionTagger>> {
        if !self.extract_section_headers {
            return Ok(None);
        }
        SectionTagger::new(&self.section_header_expr).map(Some)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| NerError::Config(format!("Read config {}: {}", path.display(), e)))
}
