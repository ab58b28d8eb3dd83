use crate::models::{NamingRules, SemanticSchemaTable};
use once_cell::sync::Lazy;

// Embed the built-in rule tables at compile time
const SEMANTIC_TYPES_YAML: &str = include_str!("semantic_types.yaml");
const NAMING_RULES_YAML: &str = include_str!("naming_rules.yaml");

// Parse the defaults once at startup
pub static DEFAULT_SEMANTIC_SCHEMAS: Lazy<SemanticSchemaTable> = Lazy::new(|| {
    serde_yaml::from_str(SEMANTIC_TYPES_YAML)
        .expect("Failed to parse built-in semantic types - this is a bug")
});

pub static DEFAULT_NAMING_RULES: Lazy<NamingRules> = Lazy::new(|| {
    serde_yaml::from_str(NAMING_RULES_YAML)
        .expect("Failed to parse built-in naming rules - this is a bug")
});
