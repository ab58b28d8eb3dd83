use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fields every artifact may carry regardless of its semantic type
pub const COMMON_FIELDS: [&str; 4] = ["apiVersion", "kind", "metadata", "dependsOn"];

/// The declared role of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Manifest,
    Schema,
    Spec,
    Governance,
    Policy,
    Role,
    Toolchain,
    Index,
    Documentation,
}

impl SemanticType {
    pub const ALL: [SemanticType; 9] = [
        SemanticType::Manifest,
        SemanticType::Schema,
        SemanticType::Spec,
        SemanticType::Governance,
        SemanticType::Policy,
        SemanticType::Role,
        SemanticType::Toolchain,
        SemanticType::Index,
        SemanticType::Documentation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Manifest => "manifest",
            SemanticType::Schema => "schema",
            SemanticType::Spec => "spec",
            SemanticType::Governance => "governance",
            SemanticType::Policy => "policy",
            SemanticType::Role => "role",
            SemanticType::Toolchain => "toolchain",
            SemanticType::Index => "index",
            SemanticType::Documentation => "documentation",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown semantic type '{0}'")]
pub struct UnknownSemanticType(pub String);

impl FromStr for SemanticType {
    type Err = UnknownSemanticType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSemanticType(s.to_string()))
    }
}

/// Shape rules for one semantic type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticTypeSchema {
    pub required_fields: BTreeSet<String>,

    #[serde(default)]
    pub optional_fields: BTreeSet<String>,

    #[serde(default)]
    pub can_depend_on: BTreeSet<SemanticType>,
}

impl SemanticTypeSchema {
    /// Whether a top-level field is permitted for this type
    pub fn allows_field(&self, field: &str) -> bool {
        self.required_fields.contains(field)
            || self.optional_fields.contains(field)
            || COMMON_FIELDS.contains(&field)
    }

    pub fn allowed_dependencies(&self) -> String {
        self.can_depend_on
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Lookup table from semantic type to its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemanticSchemaTable {
    schemas: BTreeMap<SemanticType, SemanticTypeSchema>,
}

impl SemanticSchemaTable {
    pub fn new(schemas: BTreeMap<SemanticType, SemanticTypeSchema>) -> Self {
        Self { schemas }
    }

    /// The built-in table shipped with the crate
    pub fn builtin() -> Self {
        crate::defaults::DEFAULT_SEMANTIC_SCHEMAS.clone()
    }

    pub fn get(&self, semantic_type: SemanticType) -> Option<&SemanticTypeSchema> {
        self.schemas.get(&semantic_type)
    }

    /// Resolve a type name against the table; names outside it are unknown
    pub fn resolve(&self, name: &str) -> Option<(SemanticType, &SemanticTypeSchema)> {
        let semantic_type = name.parse::<SemanticType>().ok()?;
        self.schemas.get(&semantic_type).map(|s| (semantic_type, s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SemanticType, &SemanticTypeSchema)> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SemanticSchemaTable {
    fn default() -> Self {
        Self::builtin()
    }
}
