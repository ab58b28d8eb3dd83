use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::issue::IssueKind;
use super::result::SectionResult;
use crate::config::ConfigError;
use crate::models::{FieldPath, NamespaceFormat, NamingRules};

const REQUIRED_REGISTRY_FORMAT: &str = "reverse-DNS";

static BUILTIN: Lazy<NamingValidator> = Lazy::new(|| {
    NamingValidator::new(&NamingRules::builtin())
        .expect("Failed to compile built-in naming rules - this is a bug")
});

/// Naming outcome with a breakdown per checked surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamingResult {
    #[serde(flatten)]
    pub section: SectionResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_compliance: Option<SectionResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_name_compliance: Option<SectionResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_compliance: Option<SectionResult>,
}

impl NamingResult {
    fn absorb(&mut self, part: &SectionResult) {
        for error in &part.errors {
            self.section.push_error(error.clone());
        }
        for warning in &part.warnings {
            self.section.push_warning(warning.clone());
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledNamespace {
    format: NamespaceFormat,
    regex: Regex,
}

/// Validates namespace, artifact name and version strings
#[derive(Debug, Clone)]
pub struct NamingValidator {
    namespaces: Vec<CompiledNamespace>,
    reserved_namespaces: BTreeSet<String>,
    name_pattern: Regex,
    min_length: usize,
    max_length: usize,
    reserved_words: BTreeSet<String>,
    release: Regex,
    prerelease: Regex,
    build: Regex,
}

impl Default for NamingValidator {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

/// Render a scalar for a message without JSON quoting for strings
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl NamingValidator {
    pub fn new(rules: &NamingRules) -> Result<Self, ConfigError> {
        let namespaces = rules
            .namespace_formats
            .iter()
            .map(|format| {
                Ok(CompiledNamespace {
                    regex: compile(&format!("namespace ({})", format.prefix), &format.pattern)?,
                    format: format.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            namespaces,
            reserved_namespaces: rules.reserved_namespaces.iter().cloned().collect(),
            name_pattern: compile("artifact name", &rules.artifact_name.pattern)?,
            min_length: rules.artifact_name.min_length,
            max_length: rules.artifact_name.max_length,
            reserved_words: rules.artifact_name.reserved_words.iter().cloned().collect(),
            release: compile("release version", &rules.versions.release)?,
            prerelease: compile("prerelease version", &rules.versions.prerelease)?,
            build: compile("build version", &rules.versions.build)?,
        })
    }

    /// Check every naming surface present in `metadata`.
    ///
    /// Absent metadata yields a clean result; the structural check owns that error.
    pub fn validate(&self, artifact: &Value) -> NamingResult {
        let mut result = NamingResult::default();
        let Some(metadata) = artifact.get("metadata").and_then(Value::as_object) else {
            return result;
        };

        if let Some(registry) = metadata.get("namingRegistry") {
            let part = self.validate_naming_registry(registry);
            result.absorb(&part);
            result.namespace_compliance = Some(part);
        }

        if let Some(name) = metadata.get("name") {
            let part = self.validate_artifact_name(name);
            result.absorb(&part);
            result.artifact_name_compliance = Some(part);
        }

        if let Some(version) = metadata.get("version") {
            let part = self.validate_version(version);
            result.absorb(&part);
            result.version_compliance = Some(part);
        }

        result
    }

    pub fn validate_naming_registry(&self, registry: &Value) -> SectionResult {
        let mut result = SectionResult::new();
        let base = FieldPath::from_keys(&["metadata", "namingRegistry"]);

        let empty = Map::new();
        let registry = match registry {
            Value::Object(map) => map,
            _ => {
                result.error(IssueKind::Naming, Some(base.clone()), "namingRegistry must be a mapping");
                &empty
            }
        };

        if registry.get("format").and_then(Value::as_str) != Some(REQUIRED_REGISTRY_FORMAT) {
            result.error(
                IssueKind::Naming,
                Some(base.key("format")),
                format!("Naming registry format must be '{REQUIRED_REGISTRY_FORMAT}'"),
            );
        }

        let namespace_path = base.key("namespace");
        let namespace = match registry.get("namespace") {
            Some(Value::String(ns)) => ns.clone(),
            Some(other) => {
                result.error(
                    IssueKind::Naming,
                    Some(namespace_path),
                    format!("Invalid namespace format: {}", display_value(other)),
                );
                return result;
            }
            None => String::new(),
        };

        match self.namespaces.iter().find(|ns| ns.regex.is_match(&namespace)) {
            Some(matched) => {
                if matched.format.verification_required {
                    match registry.get("verificationStatus") {
                        None => result.warning(
                            IssueKind::Naming,
                            Some(base.key("verificationStatus")),
                            format!("Namespace {namespace} requires verification"),
                        ),
                        Some(status) if status.as_str() != Some("verified") => result.warning(
                            IssueKind::Naming,
                            Some(base.key("verificationStatus")),
                            format!("Namespace {namespace} is not verified"),
                        ),
                        Some(_) => {}
                    }
                }
            }
            None => result.error(
                IssueKind::Naming,
                Some(namespace_path.clone()),
                format!("Invalid namespace format: {namespace}"),
            ),
        }

        if self.reserved_namespaces.contains(&namespace) {
            result.warning(
                IssueKind::Naming,
                Some(namespace_path),
                format!("Namespace {namespace} is reserved"),
            );
        }

        result
    }

    pub fn validate_artifact_name(&self, name: &Value) -> SectionResult {
        let mut result = SectionResult::new();
        let path = FieldPath::from_keys(&["metadata", "name"]);

        let Some(name) = name.as_str() else {
            result.error(
                IssueKind::Naming,
                Some(path),
                format!("Invalid artifact name format: {}", display_value(name)),
            );
            return result;
        };

        if !self.name_pattern.is_match(name) {
            result.error(
                IssueKind::Naming,
                Some(path.clone()),
                format!("Invalid artifact name format: {name}"),
            );
        }

        let length = name.chars().count();
        if length > self.max_length {
            result.error(
                IssueKind::Naming,
                Some(path.clone()),
                format!("Artifact name too long (max {} characters)", self.max_length),
            );
        }
        if length < self.min_length {
            result.error(
                IssueKind::Naming,
                Some(path.clone()),
                format!("Artifact name too short (min {} characters)", self.min_length),
            );
        }

        if self.reserved_words.contains(name) {
            result.warning(
                IssueKind::Naming,
                Some(path),
                format!("Artifact name uses reserved word: {name}"),
            );
        }

        result
    }

    pub fn validate_version(&self, version: &Value) -> SectionResult {
        let mut result = SectionResult::new();
        let path = FieldPath::from_keys(&["metadata", "version"]);

        match version.as_str() {
            Some(v) if self.release.is_match(v) => {}
            Some(v) if self.prerelease.is_match(v) => {
                result.warning(IssueKind::Naming, Some(path), "Using prerelease version")
            }
            Some(v) if self.build.is_match(v) => {
                result.warning(IssueKind::Naming, Some(path), "Using build version with metadata")
            }
            _ => result.error(
                IssueKind::Naming,
                Some(path),
                format!("Invalid version format: {}", display_value(version)),
            ),
        }

        result
    }
}
