//! Clinical entity category classification and normalization.

use std::collections::HashMap;

/// Normalized category for clinical NER labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ClinicalCategory {
    Problem,
    Treatment,
    Test,
    Medication,
    Dosage,
    Frequency,
    Route,
    Duration,
    Reason,
    Other,
}

impl ClinicalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalCategory::Problem => "PROBLEM",
            ClinicalCategory::Treatment => "TREATMENT",
            ClinicalCategory::Test => "TEST",
            ClinicalCategory::Medication => "MEDICATION",
            ClinicalCategory::Dosage => "DOSAGE",
            ClinicalCategory::Frequency => "FREQUENCY",
            ClinicalCategory::Route => "ROUTE",
            ClinicalCategory::Duration => "DURATION",
            ClinicalCategory::Reason => "REASON",
            ClinicalCategory::Other => "OTHER",
        }
    }

    /// Legend colour used when rendering entities of this category.
    pub fn color(&self) -> &'static str {
        match self {
            ClinicalCategory::Problem | ClinicalCategory::Medication => "#208FA8",
            ClinicalCategory::Treatment | ClinicalCategory::Dosage => "#4D5C99",
            ClinicalCategory::Test | ClinicalCategory::Frequency => "#F0451F",
            ClinicalCategory::Reason => "#C77E24",
            ClinicalCategory::Route => "#7EB083",
            ClinicalCategory::Duration => "#8A6FB0",
            ClinicalCategory::Other => "#DDDDDD",
        }
    }
}

// Map model-specific labels to normalized categories
fn get_label_map() -> &'static HashMap<&'static str, ClinicalCategory> {
    use std::sync::OnceLock;
    static LABEL_MAP: OnceLock<HashMap<&'static str, ClinicalCategory>> = OnceLock::new();
    LABEL_MAP.get_or_init(|| {
        let mut m = HashMap::new();

        // i2b2 2010 concept labels
        m.insert("PROBLEM", ClinicalCategory::Problem);
        m.insert("TREATMENT", ClinicalCategory::Treatment);
        m.insert("TEST", ClinicalCategory::Test);

        // n2c2 2009 medication labels
        m.insert("M", ClinicalCategory::Medication);
        m.insert("DO", ClinicalCategory::Dosage);
        m.insert("F", ClinicalCategory::Frequency);
        m.insert("MO", ClinicalCategory::Route);
        m.insert("DU", ClinicalCategory::Duration);
        m.insert("R", ClinicalCategory::Reason);

        // Spelled-out variants
        m.insert("MEDICATION", ClinicalCategory::Medication);
        m.insert("DRUG", ClinicalCategory::Medication);
        m.insert("DOSAGE", ClinicalCategory::Dosage);
        m.insert("FREQUENCY", ClinicalCategory::Frequency);
        m.insert("ROUTE", ClinicalCategory::Route);
        m.insert("MODE", ClinicalCategory::Route);
        m.insert("DURATION", ClinicalCategory::Duration);
        m.insert("REASON", ClinicalCategory::Reason);

        m
    })
}

/// Normalize a model-specific entity label to a [`ClinicalCategory`].
///
/// Accepts bare categories and IOB-prefixed tags, in any case.
pub fn normalize_entity_label(label: &str) -> ClinicalCategory {
    let (_, category) = crate::tag_scheme::decompose_tag(label);
    let category = category.to_uppercase();

    get_label_map()
        .get(category.as_str())
        .or_else(|| get_label_map().get(label.to_uppercase().as_str()))
        .copied()
        .unwrap_or(ClinicalCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_concept_labels() {
        assert_eq!(normalize_entity_label("PROBLEM"), ClinicalCategory::Problem);
        assert_eq!(normalize_entity_label("B-PROBLEM"), ClinicalCategory::Problem);
        assert_eq!(normalize_entity_label("I-treatment"), ClinicalCategory::Treatment);
        assert_eq!(normalize_entity_label("test"), ClinicalCategory::Test);
    }

    #[test]
    fn test_normalize_medication_labels() {
        assert_eq!(normalize_entity_label("m"), ClinicalCategory::Medication);
        assert_eq!(normalize_entity_label("B-DO"), ClinicalCategory::Dosage);
        assert_eq!(normalize_entity_label("F"), ClinicalCategory::Frequency);
        assert_eq!(normalize_entity_label("MO"), ClinicalCategory::Route);
        assert_eq!(normalize_entity_label("du"), ClinicalCategory::Duration);
        assert_eq!(normalize_entity_label("R"), ClinicalCategory::Reason);
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(normalize_entity_label("UNKNOWN"), ClinicalCategory::Other);
        assert_eq!(normalize_entity_label("B-"), ClinicalCategory::Other);
    }

    #[test]
    fn test_as_str_and_color() {
        assert_eq!(ClinicalCategory::Problem.as_str(), "PROBLEM");
        assert_eq!(ClinicalCategory::Problem.color(), "#208FA8");
        assert_eq!(ClinicalCategory::Other.as_str(), "OTHER");
    }
}
