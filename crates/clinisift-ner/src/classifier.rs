//! Token classifier seam and the name → classifier registry.

use crate::entity::TokenAnnotation;
use crate::Result;

/// Anything that labels the tokens of one sentence.
///
/// Offsets in the returned annotations are byte offsets into `sentence`.
/// Outside (`O`) tokens are expected to be dropped by the classifier.
pub trait TokenClassifier: Send + Sync {
    fn classify(&self, sentence: &str) -> Result<Vec<TokenAnnotation>>;
}

impl<F> TokenClassifier for F
where
    F: Fn(&str) -> Result<Vec<TokenAnnotation>> + Send + Sync,
{
    fn classify(&self, sentence: &str) -> Result<Vec<TokenAnnotation>> {
        self(sentence)
    }
}

/// Named token classifiers, kept in registration order.
///
/// Built once at setup and handed to the [`Parser`](crate::Parser); entity
/// lists are accumulated model by model in this order.
#[derive(Default)]
pub struct ModelRegistry {
    models: Vec<(String, Box<dyn TokenClassifier>)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a classifier; an existing name is replaced in place.
    pub fn register(&mut self, name: impl Into<String>, classifier: impl TokenClassifier + 'static) -> &mut Self {
        let name = name.into();
        let classifier: Box<dyn TokenClassifier> = Box::new(classifier);
        match self.models.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = classifier,
            None => self.models.push((name, classifier)),
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, classifier: impl TokenClassifier + 'static) -> Self {
        self.register(name, classifier);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn TokenClassifier> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn TokenClassifier)> {
        self.models.iter().map(|(n, c)| (n.as_str(), c.as_ref()))
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.model_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(tag: &'static str) -> impl Fn(&str) -> Result<Vec<TokenAnnotation>> + Send + Sync {
        move |sentence: &str| Ok(vec![TokenAnnotation::new(tag, 0, sentence.len(), sentence)])
    }

    #[test]
    fn test_registration_order() {
        let registry = ModelRegistry::new().with("clinical", fixed("B-PROBLEM")).with("medication", fixed("B-M"));
        assert_eq!(registry.model_names(), vec!["clinical", "medication"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_replaces_existing_name() {
        let mut registry = ModelRegistry::new();
        registry.register("clinical", fixed("B-PROBLEM"));
        registry.register("medication", fixed("B-M"));
        registry.register("clinical", fixed("B-TEST"));

        assert_eq!(registry.model_names(), vec!["clinical", "medication"]);
        let tokens = registry.get("clinical").unwrap().classify("ekg").unwrap();
        assert_eq!(tokens[0].tag, "B-TEST");
    }

    #[test]
    fn test_missing_model() {
        assert!(ModelRegistry::new().get("clinical").is_none());
    }
}
