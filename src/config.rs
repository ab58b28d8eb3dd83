//! Validator configuration, loadable from a YAML rules file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{NamingRules, SemanticSchemaTable};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read rules file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rules from {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Everything the validation engine can be tuned with.
///
/// Every field falls back to the built-in default, so a rules file only
/// needs to name what it overrides. Tables are replaced wholesale, not merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Escalate warnings to failures
    pub strict: bool,

    /// Run the independent validators on the rayon pool
    pub parallel: bool,

    /// Key suffixes that mark a field as a reference
    pub reference_suffixes: Vec<String>,

    pub naming: NamingRules,

    pub semantic_types: SemanticSchemaTable,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict: false,
            parallel: true,
            reference_suffixes: vec!["Ref".to_string(), "Reference".to_string()],
            naming: NamingRules::builtin(),
            semantic_types: SemanticSchemaTable::builtin(),
        }
    }
}

impl ValidatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&path.display().to_string(), &content)
    }

    pub fn from_yaml_str(name: &str, content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            name: name.to_string(),
            source,
        })
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
