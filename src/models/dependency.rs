use serde::Serialize;
use serde_json::Value;

use super::path::FieldPath;

/// One entry of an artifact's `dependsOn` list, as far as it could be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyDeclaration {
    pub index: usize,

    #[serde(skip)]
    pub path: FieldPath,

    pub artifact: Option<Value>,
    pub purpose: Option<Value>,
    pub version: Option<Value>,
    pub semantic_type: Option<Value>,
}

impl DependencyDeclaration {
    /// Read a declaration from a mapping entry; non-mappings yield `None`
    pub fn from_value(index: usize, value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            index,
            path: FieldPath::root().key("dependsOn").index(index),
            artifact: map.get("artifact").cloned(),
            purpose: map.get("purpose").cloned(),
            version: map.get("version").cloned(),
            semantic_type: map.get("semanticType").cloned(),
        })
    }

    pub fn artifact_id(&self) -> Option<&str> {
        self.artifact.as_ref().and_then(Value::as_str)
    }

    pub fn semantic_type_name(&self) -> Option<&str> {
        self.semantic_type.as_ref().and_then(Value::as_str)
    }
}

/// Identity of an artifact inside the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactIdentity {
    /// `namespace/name` when a namespace is declared, else the bare name
    pub id: String,

    /// Other names dependents may use to point at this artifact
    pub aliases: Vec<String>,
}

impl ArtifactIdentity {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn of(artifact: &Value) -> Self {
        let metadata = artifact.get("metadata");
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or(Self::UNKNOWN);
        let namespace = metadata
            .and_then(|m| m.get("namingRegistry"))
            .and_then(|r| r.get("namespace"))
            .and_then(Value::as_str)
            .filter(|ns| !ns.is_empty());

        match namespace {
            Some(ns) => Self {
                id: format!("{ns}/{name}"),
                aliases: vec![name.to_string()],
            },
            None => Self {
                id: name.to_string(),
                aliases: Vec::new(),
            },
        }
    }
}

/// The entries of `dependsOn` when it is a sequence
pub fn dependency_entries(artifact: &Value) -> Option<&Vec<Value>> {
    artifact.get("dependsOn").and_then(Value::as_array)
}
