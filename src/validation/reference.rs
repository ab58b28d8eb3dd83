use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::issue::IssueKind;
use super::result::SectionResult;
use crate::models::{ArtifactRegistry, FieldPath};

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9.-]+/[a-z0-9-]+$").expect("Invalid reference regex"));

static VERSIONED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9.-]+/[a-z0-9-]+:\d+\.\d+\.\d+$").expect("Invalid versioned reference regex")
});

/// `namespace/artifact-name`, optionally pinned with `:X.Y.Z`
pub fn is_valid_reference(value: &str) -> bool {
    REFERENCE.is_match(value) || VERSIONED_REFERENCE.is_match(value)
}

/// A reference-like field found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceFinding {
    pub path: FieldPath,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceResult {
    #[serde(flatten)]
    pub section: SectionResult,

    pub references: Vec<ReferenceFinding>,
    pub broken_references: Vec<ReferenceFinding>,
    pub missing_targets: Vec<ReferenceFinding>,
}

enum Pending<'v> {
    Visit(FieldPath, &'v Value),
    Emit(FieldPath, &'v Value),
}

/// Finds reference fields and checks their syntax and resolvability
#[derive(Clone, Copy)]
pub struct ReferenceValidator<'a> {
    suffixes: &'a [String],
    registry: Option<&'a dyn ArtifactRegistry>,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(suffixes: &'a [String], registry: Option<&'a dyn ArtifactRegistry>) -> Self {
        Self { suffixes, registry }
    }

    fn is_reference_key(&self, key: &str) -> bool {
        self.suffixes.iter().any(|suffix| key.ends_with(suffix.as_str()))
    }

    /// Collect reference fields depth-first, without descending into them.
    ///
    /// Mapping keys are visited in sorted order and sequences by index, so the
    /// result does not depend on how the parser ordered the keys.
    pub fn extract_references(&self, artifact: &Value) -> Vec<ReferenceFinding> {
        let mut findings = Vec::new();
        let mut stack = vec![Pending::Visit(FieldPath::root(), artifact)];

        while let Some(pending) = stack.pop() {
            let (path, node) = match pending {
                Pending::Emit(path, value) => {
                    findings.push(ReferenceFinding {
                        path,
                        value: value.clone(),
                    });
                    continue;
                }
                Pending::Visit(path, node) => (path, node),
            };

            // Children are pushed in reverse so they pop in visiting order
            match node {
                Value::Object(map) => {
                    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                    entries.sort_by(|a, b| a.0.cmp(b.0));
                    for (key, value) in entries.into_iter().rev() {
                        if self.is_reference_key(key) {
                            stack.push(Pending::Emit(path.key(key), value));
                        } else if value.is_object() || value.is_array() {
                            stack.push(Pending::Visit(path.key(key), value));
                        }
                    }
                }
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate().rev() {
                        if item.is_object() || item.is_array() {
                            stack.push(Pending::Visit(path.index(index), item));
                        }
                    }
                }
                _ => {}
            }
        }

        findings
    }

    pub fn validate(&self, artifact: &Value) -> ReferenceResult {
        let mut result = ReferenceResult {
            references: self.extract_references(artifact),
            ..Default::default()
        };

        for finding in result.references.clone() {
            let Some(value) = finding.value.as_str() else {
                result.section.error(
                    IssueKind::Reference,
                    Some(finding.path.clone()),
                    format!("Invalid reference format at {}", finding.path),
                );
                result.broken_references.push(finding);
                continue;
            };

            if !is_valid_reference(value) {
                result.section.error(
                    IssueKind::Reference,
                    Some(finding.path.clone()),
                    format!("Invalid reference format: {value} (at {})", finding.path),
                );
                result.broken_references.push(finding);
                continue;
            }

            if let Some(registry) = self.registry
                && !resolves(registry, value)
            {
                result.section.warning(
                    IssueKind::Reference,
                    Some(finding.path.clone()),
                    format!("Reference target not found in registry: {value}"),
                );
                result.missing_targets.push(finding);
            }
        }

        result
    }
}

/// Look the reference up as written, then without its version pin
fn resolves(registry: &dyn ArtifactRegistry, reference: &str) -> bool {
    if registry.contains(reference) {
        return true;
    }
    match reference.rsplit_once(':') {
        Some((unversioned, _)) => registry.contains(unversioned),
        None => false,
    }
}
