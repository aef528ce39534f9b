use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::error;

const TAXONOMY_JSON: &str = include_str!("../../resources/policy_tags.json");

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyTag {
    pub name: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyTagTaxonomy {
    pub version: String,
    pub tags: Vec<PolicyTag>,
}

impl PolicyTagTaxonomy {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }

    pub fn find(&self, name: &str) -> Option<&PolicyTag> {
        self.tags.iter().find(|tag| tag.name == name)
    }
}

static TAXONOMY: Lazy<PolicyTagTaxonomy> = Lazy::new(|| {
    PolicyTagTaxonomy::from_json(TAXONOMY_JSON).unwrap_or_else(|err| {
        error!(error = %err, "Failed to parse bundled policy tag taxonomy");
        PolicyTagTaxonomy::default()
    })
});

/// Process-wide taxonomy, parsed on first use.
pub fn taxonomy() -> &'static PolicyTagTaxonomy {
    &TAXONOMY
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_taxonomy_parses() {
        let taxonomy = taxonomy();
        assert_eq!(taxonomy.tags.len(), 36);
        assert!(!taxonomy.version.is_empty());
    }

    #[test]
    fn test_tag_names_unique() {
        let names: HashSet<&str> = taxonomy().names().collect();
        assert_eq!(names.len(), taxonomy().tags.len());
    }

    #[test]
    fn test_environment_tag_has_quality_synonym() {
        let tag = taxonomy().find("סביבה ואקלים").unwrap();
        assert!(tag.synonyms.iter().any(|s| s == "איכות הסביבה"));
    }
}
