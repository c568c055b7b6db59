//! Category include/exclude filtering and provenance stamping.

use tracing::warn;

use crate::entity::EntitySpan;

/// Keeps or drops entities by category.
///
/// Categories are compared lower-cased. A non-empty include list wins over
/// the exclude list; that conflict is resolved once, in [`EntityFilter::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl EntityFilter {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let include: Vec<String> = include.into_iter().map(|c| c.as_ref().to_lowercase()).collect();
        let mut exclude: Vec<String> = exclude.into_iter().map(|c| c.as_ref().to_lowercase()).collect();

        if !include.is_empty() && !exclude.is_empty() {
            warn!(
                "Both include_ents ({:?}) and exclude_ents ({:?}) are set; ignoring exclude_ents",
                include, exclude
            );
            exclude.clear();
        }

        Self { include, exclude }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn keeps(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        if !self.include.is_empty() {
            self.include.contains(&category)
        } else if !self.exclude.is_empty() {
            !self.exclude.contains(&category)
        } else {
            true
        }
    }

    pub fn apply(&self, entities: Vec<EntitySpan>) -> Vec<EntitySpan> {
        entities.into_iter().filter(|e| self.keeps(&e.category)).collect()
    }
}

/// Record which model produced the entities and which sentence they belong to.
pub(crate) fn stamp(entities: &mut [EntitySpan], model: &str, sentence_index: usize) {
    for entity in entities {
        entity.source_model = model.to_string();
        entity.sentence_index = sentence_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<EntitySpan> {
        vec![
            EntitySpan::unstamped("aspirin", "M", 0, 7),
            EntitySpan::unstamped("81 mg", "DO", 8, 13),
            EntitySpan::unstamped("daily", "F", 14, 19),
        ]
    }

    fn categories(entities: &[EntitySpan]) -> Vec<&str> {
        entities.iter().map(|e| e.category.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_passes_through() {
        let filter = EntityFilter::default();
        assert_eq!(filter.apply(entities()), entities());
    }

    #[test]
    fn test_include_is_case_insensitive() {
        let filter = EntityFilter::new(["m", "F"], Vec::<String>::new());
        assert_eq!(categories(&filter.apply(entities())), vec!["M", "F"]);
    }

    #[test]
    fn test_exclude() {
        let filter = EntityFilter::new(Vec::<String>::new(), ["do"]);
        assert_eq!(categories(&filter.apply(entities())), vec!["M", "F"]);
    }

    #[test]
    fn test_include_overrides_exclude() {
        let both = EntityFilter::new(["m"], ["m", "f"]);
        let only_include = EntityFilter::new(["m"], Vec::<String>::new());
        assert!(both.exclude().is_empty());
        assert_eq!(both, only_include);
        assert_eq!(both.apply(entities()), only_include.apply(entities()));
    }

    #[test]
    fn test_refilter_is_noop() {
        let filter = EntityFilter::new(["m", "do"], Vec::<String>::new());
        let once = filter.apply(entities());
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stamp() {
        let mut ents = entities();
        stamp(&mut ents, "medication", 3);
        assert!(ents.iter().all(|e| e.source_model == "medication" && e.sentence_index == 3));
    }
}
