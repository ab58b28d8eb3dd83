use serde::Serialize;
use serde_json::Value;

use super::issue::{Issue, IssueKind};
use super::result::SectionResult;
use crate::models::dependency::dependency_entries;
use crate::models::{FieldPath, SemanticSchemaTable, SemanticType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemanticResult {
    #[serde(flatten)]
    pub section: SectionResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<SemanticType>,

    pub type_violations: Vec<String>,
    pub relationship_violations: Vec<String>,
}

/// Checks an artifact's shape and dependencies against its semantic type
#[derive(Debug, Clone, Default)]
pub struct SemanticTypeValidator {
    schemas: SemanticSchemaTable,
}

impl SemanticTypeValidator {
    pub fn new(schemas: SemanticSchemaTable) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &SemanticSchemaTable {
        &self.schemas
    }

    pub fn validate(&self, artifact: &Value) -> SemanticResult {
        let mut result = SemanticResult::default();
        let type_path = FieldPath::from_keys(&["metadata", "semanticType"]);

        let Some(declared) = artifact.get("metadata").and_then(|m| m.get("semanticType")) else {
            result
                .section
                .error(IssueKind::SemanticType, Some(type_path), "Missing semanticType in metadata");
            return result;
        };

        let type_name = match declared {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let Some((semantic_type, schema)) = self.schemas.resolve(&type_name) else {
            result.section.error(
                IssueKind::SemanticType,
                Some(type_path),
                format!("Invalid semantic type: {type_name}"),
            );
            return result;
        };
        result.semantic_type = Some(semantic_type);

        for field in &schema.required_fields {
            if artifact.get(field).is_none() {
                let message = format!("Missing required field for {semantic_type}: {field}");
                result.type_violations.push(message.clone());
                result.section.push_error(Issue::at(
                    IssueKind::SemanticType,
                    FieldPath::root().key(field),
                    message,
                ));
            }
        }

        if let Some(fields) = artifact.as_object() {
            let mut unexpected: Vec<&String> =
                fields.keys().filter(|f| !schema.allows_field(f)).collect();
            unexpected.sort();

            for field in unexpected {
                let message = format!("Unexpected field for {semantic_type}: {field}");
                result.type_violations.push(message.clone());
                result.section.push_error(Issue::at(
                    IssueKind::SemanticType,
                    FieldPath::root().key(field),
                    message,
                ));
            }
        }

        for (index, dependency) in dependency_entries(artifact).into_iter().flatten().enumerate() {
            let Some(dep_type) = dependency.get("semanticType") else {
                continue;
            };
            let dep_type_name = match dep_type {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            let allowed = dep_type_name
                .parse::<SemanticType>()
                .is_ok_and(|t| schema.can_depend_on.contains(&t));
            if !allowed {
                let message = format!(
                    "{semantic_type} cannot depend on {dep_type_name}. Allowed: {}",
                    schema.allowed_dependencies()
                );
                result.relationship_violations.push(message.clone());
                result.section.push_warning(Issue::at(
                    IssueKind::SemanticType,
                    FieldPath::root().key("dependsOn").index(index).key("semanticType"),
                    message,
                ));
            }
        }

        result
    }
}
