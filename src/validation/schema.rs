use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::issue::IssueKind;
use super::result::SectionResult;
use crate::models::FieldPath;

// JSON Schema draft-07, matching the schemas artifact authors already publish
use jsonschema::draft7 as schema_draft;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to compile schema {name}: {message}")]
    Compile { name: String, message: String },
}

/// Validates whole documents against a caller-supplied JSON Schema
pub struct SchemaValidator {
    name: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").field("name", &self.name).finish()
    }
}

impl SchemaValidator {
    pub fn new(name: &str, schema: &Value) -> Result<Self, SchemaError> {
        let validator = schema_draft::options()
            .build(schema)
            .map_err(|e| SchemaError::Compile {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            validator,
        })
    }

    /// Load a schema written in YAML or JSON
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Value = serde_yaml::from_str(&content).map_err(|source| SchemaError::Parse {
            name: name.clone(),
            source,
        })?;
        Self::new(&name, &schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extract a more specific instance path for certain validation errors
    fn refine_instance_path(error: &jsonschema::ValidationError) -> String {
        let error_msg = error.to_string();

        // Point "additional properties" errors at the offending key
        if error_msg.contains("Additional properties are not allowed")
            && let Some(start) = error_msg.find("('")
            && let Some(end) = error_msg[start + 2..].find('\'')
        {
            let prop_name = &error_msg[start + 2..start + 2 + end];
            return format!("{}/{prop_name}", error.instance_path);
        }

        error.instance_path.to_string()
    }

    pub fn validate(&self, artifact: &Value) -> SectionResult {
        let mut result = SectionResult::new();

        for error in self.validator.iter_errors(artifact) {
            let pointer = Self::refine_instance_path(&error);
            let path = FieldPath::from_pointer(&pointer, artifact);
            let message = if path.is_root() {
                format!("Schema violation: {error}")
            } else {
                format!("Schema violation at {path}: {error}")
            };
            result.error(IssueKind::Schema, Some(path), message);
        }

        debug!("Schema {} reported {} violations", self.name, result.errors.len());
        result
    }
}
