use serde_json::Value;

use super::issue::IssueKind;
use super::result::SectionResult;
use crate::models::FieldPath;

pub const REQUIRED_TOP_LEVEL: [&str; 3] = ["apiVersion", "kind", "metadata"];
pub const REQUIRED_METADATA: [&str; 3] = ["name", "version", "semanticType"];

/// Checks the mandatory top-level and metadata fields
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, artifact: &Value) -> SectionResult {
        let mut result = SectionResult::new();

        for field in REQUIRED_TOP_LEVEL {
            if artifact.get(field).is_none() {
                result.error(
                    IssueKind::Structural,
                    Some(FieldPath::root().key(field)),
                    format!("Missing required field: {field}"),
                );
            }
        }

        match artifact.get("metadata") {
            // Already reported above
            None => {}
            Some(Value::Object(metadata)) => {
                for field in REQUIRED_METADATA {
                    if !metadata.contains_key(field) {
                        result.error(
                            IssueKind::Structural,
                            Some(FieldPath::from_keys(&["metadata", field])),
                            format!("Missing required metadata field: {field}"),
                        );
                    }
                }
            }
            Some(_) => result.error(
                IssueKind::Structural,
                Some(FieldPath::root().key("metadata")),
                "metadata must be a mapping",
            ),
        }

        result
    }
}
