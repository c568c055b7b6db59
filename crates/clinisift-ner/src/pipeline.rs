//! Multi-model clinical NER pipeline.
//!
//! Runs every registered token classifier over every sentence and turns the
//! raw token labels into filtered, provenance-stamped entity spans.

use tracing::debug;

use crate::classifier::{ModelRegistry, TokenClassifier};
use crate::config::ParserConfig;
use crate::entity::EntitySpan;
use crate::filter::{stamp, EntityFilter};
use crate::sections::SectionTagger;
use crate::segment::{splitter_by_name, SentenceSplitter};
use crate::tag_scheme::resolve_tags;
use crate::wordpiece::merge_wordpieces;
use crate::Result;

/// Configured parser: models, sentence splitter, filter and section tagger.
///
/// Everything is validated here, once, so parsing a document cannot fail on
/// configuration.
pub struct Parser {
    config: ParserConfig,
    models: ModelRegistry,
    splitter: Box<dyn SentenceSplitter>,
    filter: EntityFilter,
    section_tagger: Option<SectionTagger>,
}

impl Parser {
    pub fn new(config: ParserConfig, models: ModelRegistry) -> Result<Self> {
        let splitter = splitter_by_name(&config.sent_tokenizer)?;
        Self::with_splitter(config, models, splitter)
    }

    /// Use a custom sentence splitter instead of the configured one.
    pub fn with_splitter(
        config: ParserConfig,
        models: ModelRegistry,
        splitter: Box<dyn SentenceSplitter>,
    ) -> Result<Self> {
        let filter = config.entity_filter();
        let section_tagger = config.section_tagger()?;
        Ok(Self {
            config,
            models,
            splitter,
            filter,
            section_tagger,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn splitter(&self) -> &dyn SentenceSplitter {
        self.splitter.as_ref()
    }

    pub fn filter(&self) -> &EntityFilter {
        &self.filter
    }

    pub fn section_tagger(&self) -> Option<&SectionTagger> {
        self.section_tagger.as_ref()
    }

    /// Entities one model finds in one sentence, before filtering.
    ///
    /// Offsets are relative to `sentence`.
    pub fn ner_sentence(&self, model: &dyn TokenClassifier, sentence: &str) -> Result<Vec<EntitySpan>> {
        let tokens = model.classify(sentence)?;
        let mut spans = merge_wordpieces(&tokens, sentence)?;
        if self.config.iob_resolve {
            spans = resolve_tags(&spans, Some(sentence))?;
        }
        Ok(spans.into_iter().map(EntitySpan::from).collect())
    }

    /// Per-sentence entity lists for one model: filtered and stamped.
    pub fn ner_document<S: AsRef<str>>(
        &self,
        name: &str,
        model: &dyn TokenClassifier,
        sentences: &[S],
    ) -> Result<Vec<Vec<EntitySpan>>> {
        sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| {
                let mut entities = self.filter.apply(self.ner_sentence(model, sentence.as_ref())?);
                stamp(&mut entities, name, i);
                debug!("{}: sentence {} -> {} entities", name, i, entities.len());
                Ok(entities)
            })
            .collect()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("models", &self.models)
            .field("filter", &self.filter)
            .field("section_tagger", &self.section_tagger)
            .finish()
    }
}
