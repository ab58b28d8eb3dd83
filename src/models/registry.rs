//! Artifact registry lookups used for existence checks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimal metadata the registry keeps per artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
}

impl RegistryEntry {
    pub fn new(version: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            artifact_type: Some(artifact_type.into()),
        }
    }
}

/// Read-only view of registered artifacts.
///
/// Implementations must not perform I/O during lookups; a remote registry
/// should be fetched into memory by the caller first.
pub trait ArtifactRegistry: Send + Sync {
    fn get(&self, id: &str) -> Option<&RegistryEntry>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read registry file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse registry {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Registry backed by an in-memory map, loadable from YAML or JSON
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mapping of `id -> {version, type}` from a file
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&path.display().to_string(), &content)
    }

    pub fn from_yaml_str(name: &str, content: &str) -> Result<Self, RegistryError> {
        // An empty file is an empty registry
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let raw: Option<BTreeMap<String, Option<RegistryEntry>>> = serde_yaml::from_str(content)
            .map_err(|source| RegistryError::Parse {
                name: name.to_string(),
                source,
            })?;

        let entries = raw
            .unwrap_or_default()
            .into_iter()
            .map(|(id, entry)| (id, entry.unwrap_or_default()))
            .collect();

        Ok(Self { entries })
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: RegistryEntry) -> &mut Self {
        self.entries.insert(id.into(), entry);
        self
    }

    pub fn with(mut self, id: impl Into<String>, entry: RegistryEntry) -> Self {
        self.insert(id, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl ArtifactRegistry for InMemoryRegistry {
    fn get(&self, id: &str) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }
}

impl FromIterator<(String, RegistryEntry)> for InMemoryRegistry {
    fn from_iter<I: IntoIterator<Item = (String, RegistryEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
