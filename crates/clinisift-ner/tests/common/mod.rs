//! Shared fixtures: lexicon-driven stand-ins for the BERT classifiers.
//!
//! Words are cut into word pieces of at most four characters, the way a
//! sub-word tokenizer would, so the merge and tag steps get real work.

#![allow(dead_code)]

use std::collections::HashMap;

use clinisift_ner::{ModelRegistry, Parser, ParserConfig, Result, TokenAnnotation};

pub const NOTE: &str = "HPI: Patient reports chest pain. No fever.\n\n\
                        MEDICATIONS: Continue aspirin daily. Metoprolol held.\n\n\
                        PLAN: Repeat troponin.";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Byte offset and text of every whitespace-separated word, trailing
/// punctuation removed.
fn words(sentence: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in sentence.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                out.push((s, &sentence[s..i]));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push((s, &sentence[s..]));
    }
    out.into_iter()
        .map(|(s, w)| (s, w.trim_end_matches(|c: char| c.is_ascii_punctuation())))
        .filter(|(_, w)| !w.is_empty())
        .collect()
}

pub fn lexicon_model(
    entries: &[(&str, &str)],
) -> impl Fn(&str) -> Result<Vec<TokenAnnotation>> + Send + Sync + 'static {
    let lexicon: HashMap<String, String> = entries
        .iter()
        .map(|(word, tag)| (word.to_lowercase(), tag.to_string()))
        .collect();

    move |sentence: &str| {
        let mut tokens = Vec::new();
        for (offset, word) in words(sentence) {
            let Some(tag) = lexicon.get(&word.to_lowercase()) else {
                continue;
            };
            let category = tag.split_once('-').map_or(tag.as_str(), |(_, c)| c);

            let mut bounds: Vec<usize> = word.char_indices().map(|(i, _)| i).step_by(4).collect();
            bounds.push(word.len());
            for (n, pair) in bounds.windows(2).enumerate() {
                let (start, end) = (offset + pair[0], offset + pair[1]);
                let piece = &word[pair[0]..pair[1]];
                if n == 0 {
                    tokens.push(TokenAnnotation::new(tag.clone(), start, end, piece));
                } else {
                    tokens.push(TokenAnnotation::new(format!("I-{}", category), start, end, format!("##{}", piece)));
                }
            }
        }
        Ok(tokens)
    }
}

pub fn clinical_model() -> impl Fn(&str) -> Result<Vec<TokenAnnotation>> + Send + Sync + 'static {
    lexicon_model(&[
        ("chest", "B-PROBLEM"),
        ("pain", "I-PROBLEM"),
        ("fever", "B-PROBLEM"),
        ("troponin", "B-TEST"),
    ])
}

pub fn medication_model() -> impl Fn(&str) -> Result<Vec<TokenAnnotation>> + Send + Sync + 'static {
    lexicon_model(&[("aspirin", "B-M"), ("daily", "B-F"), ("metoprolol", "B-M")])
}

pub fn registry() -> ModelRegistry {
    ModelRegistry::new()
        .with("clinical", clinical_model())
        .with("medication", medication_model())
}

pub fn parser(config: ParserConfig) -> Parser {
    Parser::new(config, registry()).expect("valid parser config")
}

pub fn sectioned_config() -> ParserConfig {
    ParserConfig {
        extract_section_headers: true,
        ..Default::default()
    }
}
