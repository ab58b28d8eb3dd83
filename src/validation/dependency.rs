use once_cell::sync::Lazy;
use regex::Regex;
use semver::{Version, VersionReq};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::issue::IssueKind;
use super::result::SectionResult;
use crate::graph::DependencyGraph;
use crate::models::{ArtifactIdentity, ArtifactRegistry, DependencyDeclaration, FieldPath};

static VERSION_CONSTRAINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\^|~|>=|<=)?\d+\.\d+\.\d+$").expect("Invalid version constraint regex")
});

const REQUIRED_DEPENDENCY_FIELDS: [&str; 2] = ["artifact", "purpose"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyResult {
    #[serde(flatten)]
    pub section: SectionResult,

    pub missing_dependencies: Vec<String>,
    pub invalid_versions: Vec<String>,
    pub unsatisfied_versions: Vec<String>,
    pub circular_dependencies: Vec<Vec<String>>,
}

impl DependencyResult {
    /// Record detected cycles as errors
    pub fn attach_cycles(&mut self, cycles: Vec<Vec<String>>) {
        for cycle in cycles {
            self.section.error(
                IssueKind::Graph,
                Some(FieldPath::root().key("dependsOn")),
                format!("Circular dependency detected: {}", cycle.join(" -> ")),
            );
            self.circular_dependencies.push(cycle);
        }
    }
}

/// Whether `constraint` is an exact, `^`, `~`, `>=` or `<=` semver constraint
pub fn is_valid_version_constraint(constraint: &str) -> bool {
    VERSION_CONSTRAINT.is_match(constraint)
}

fn version_requirement(constraint: &str) -> Option<VersionReq> {
    let starts_with_operator = constraint.starts_with(['^', '~', '>', '<']);
    let normalized = if starts_with_operator {
        constraint.to_string()
    } else {
        format!("={constraint}")
    };
    VersionReq::parse(&normalized).ok()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validates `dependsOn` declarations and feeds them into a dependency graph
#[derive(Clone, Copy, Default)]
pub struct DependencyValidator<'a> {
    registry: Option<&'a dyn ArtifactRegistry>,
}

impl<'a> DependencyValidator<'a> {
    pub fn new(registry: Option<&'a dyn ArtifactRegistry>) -> Self {
        Self { registry }
    }

    /// Validate one artifact in isolation: declarations plus cycle detection
    pub fn validate_dependencies(&self, artifact: &Value, graph: &mut DependencyGraph) -> DependencyResult {
        let mut result = self.check_declarations(artifact, graph);
        result.attach_cycles(graph.find_cycles());
        result
    }

    /// Check each declaration and add the artifact's edges to `graph`.
    ///
    /// Cycle detection is left to the caller so a batch can build the whole
    /// graph before running it once.
    pub fn check_declarations(&self, artifact: &Value, graph: &mut DependencyGraph) -> DependencyResult {
        let mut result = DependencyResult::default();
        let identity = ArtifactIdentity::of(artifact);
        graph.add_artifact(&identity.id, &identity.aliases);

        let Some(depends_on) = artifact.get("dependsOn") else {
            return result;
        };
        let Some(entries) = depends_on.as_array() else {
            result.section.error(
                IssueKind::Graph,
                Some(FieldPath::root().key("dependsOn")),
                "dependsOn must be an array",
            );
            return result;
        };

        for (index, entry) in entries.iter().enumerate() {
            let Some(declaration) = DependencyDeclaration::from_value(index, entry) else {
                result.section.error(
                    IssueKind::Graph,
                    Some(FieldPath::root().key("dependsOn").index(index)),
                    format!("dependsOn[{index}] must be a mapping"),
                );
                continue;
            };
            self.check_declaration(&declaration, &mut result);

            if let Some(target) = declaration.artifact_id() {
                graph.add_dependency(&identity.id, target);
            }
        }

        debug!(
            "Checked {} dependencies of {} ({} errors, {} warnings)",
            entries.len(),
            identity.id,
            result.section.errors.len(),
            result.section.warnings.len()
        );

        result
    }

    fn check_declaration(&self, declaration: &DependencyDeclaration, result: &mut DependencyResult) {
        let index = declaration.index;
        for field in REQUIRED_DEPENDENCY_FIELDS {
            let present = match field {
                "artifact" => declaration.artifact.is_some(),
                _ => declaration.purpose.is_some(),
            };
            if !present {
                result.section.error(
                    IssueKind::Graph,
                    Some(declaration.path.key(field)),
                    format!("dependsOn[{index}] missing required field: {field}"),
                );
            }
        }

        let target = match &declaration.artifact {
            Some(Value::String(target)) => Some(target.as_str()),
            Some(other) => {
                result.section.error(
                    IssueKind::Graph,
                    Some(declaration.path.key("artifact")),
                    format!("dependsOn[{index}].artifact must be a string, found {other}"),
                );
                None
            }
            None => None,
        };

        let constraint = match &declaration.version {
            Some(Value::String(v)) if is_valid_version_constraint(v) => Some(v.as_str()),
            Some(other) => {
                let shown = display_value(other);
                result.section.warning(
                    IssueKind::Graph,
                    Some(declaration.path.key("version")),
                    format!("Invalid version constraint: {shown}"),
                );
                result.invalid_versions.push(shown);
                None
            }
            None => None,
        };

        let (Some(registry), Some(target)) = (self.registry, target) else {
            return;
        };

        match registry.get(target) {
            None => {
                result.section.warning(
                    IssueKind::Graph,
                    Some(declaration.path.key("artifact")),
                    format!("Dependency artifact not found in registry: {target}"),
                );
                result.missing_dependencies.push(target.to_string());
            }
            Some(entry) => {
                let (Some(constraint), Some(registered)) = (constraint, entry.version.as_deref()) else {
                    return;
                };
                let (Some(requirement), Ok(version)) =
                    (version_requirement(constraint), Version::parse(registered))
                else {
                    debug!("Skipping version check for {target}: cannot compare {constraint} with {registered}");
                    return;
                };
                if !requirement.matches(&version) {
                    result.section.warning(
                        IssueKind::Graph,
                        Some(declaration.path.key("version")),
                        format!("Dependency {target} requires {constraint} but registry has {registered}"),
                    );
                    result.unsatisfied_versions.push(target.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InMemoryRegistry, RegistryEntry};
    use serde_json::json;

    fn manifest(name: &str, depends_on: Value) -> Value {
        json!({
            "apiVersion": "v1",
            "kind": "Manifest",
            "metadata": {"name": name, "version": "1.0.0", "semanticType": "manifest"},
            "spec": {},
            "dependsOn": depends_on
        })
    }

    #[test]
    fn test_valid_dependencies() {
        let mut graph = DependencyGraph::new();
        let result = DependencyValidator::default().validate_dependencies(
            &manifest(
                "artifact-a",
                json!([{"artifact": "com.example/b", "purpose": "config", "version": "^1.0.0"}]),
            ),
            &mut graph,
        );
        assert!(result.section.valid);
        assert!(result.circular_dependencies.is_empty());
        assert_eq!(graph.get_dependencies("artifact-a"), vec!["com.example/b"]);
    }

    #[test]
    fn test_depends_on_must_be_array() {
        let mut graph = DependencyGraph::new();
        let result = DependencyValidator::default()
            .validate_dependencies(&manifest("artifact-a", json!("oops")), &mut graph);
        assert!(!result.section.valid);
        assert_eq!(result.section.errors[0].message, "dependsOn must be an array");
    }

    #[test]
    fn test_missing_fields_and_non_mapping_entries() {
        let mut graph = DependencyGraph::new();
        let result = DependencyValidator::default().validate_dependencies(
            &manifest("artifact-a", json!([{"artifact": "b"}, "c"])),
            &mut graph,
        );
        let messages: Vec<_> = result.section.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "dependsOn[0] missing required field: purpose",
                "dependsOn[1] must be a mapping"
            ]
        );
        assert_eq!(
            result.section.errors[0].path.as_ref().unwrap().to_string(),
            "dependsOn[0].purpose"
        );
    }

    #[test]
    fn test_invalid_version_constraint_is_warning() {
        let mut graph = DependencyGraph::new();
        let result = DependencyValidator::default().validate_dependencies(
            &manifest(
                "artifact-a",
                json!([{"artifact": "b", "purpose": "x", "version": "latest"}]),
            ),
            &mut graph,
        );
        assert!(result.section.valid);
        assert_eq!(result.invalid_versions, vec!["latest"]);
        assert!(result.section.has_warning_containing("Invalid version constraint: latest"));
    }

    #[test]
    fn test_version_constraint_grammar() {
        for ok in ["1.0.0", "^1.2.3", "~0.1.0", ">=2.0.0", "<=3.1.4"] {
            assert!(is_valid_version_constraint(ok), "{ok}");
        }
        for bad in ["1.0", ">1.0.0", "v1.0.0", "1.0.0-beta", "*"] {
            assert!(!is_valid_version_constraint(bad), "{bad}");
        }
    }

    #[test]
    fn test_registry_lookups() {
        let registry = InMemoryRegistry::new()
            .with("com.example/present", RegistryEntry::new("1.4.0", "schema"))
            .with("com.example/old", RegistryEntry::new("0.9.0", "schema"));
        let validator = DependencyValidator::new(Some(&registry));
        let mut graph = DependencyGraph::new();

        let result = validator.validate_dependencies(
            &manifest(
                "artifact-a",
                json!([
                    {"artifact": "com.example/present", "purpose": "x", "version": "^1.0.0"},
                    {"artifact": "com.example/old", "purpose": "y", "version": ">=1.0.0"},
                    {"artifact": "com.example/absent", "purpose": "z"}
                ]),
            ),
            &mut graph,
        );

        assert!(result.section.valid);
        assert_eq!(result.missing_dependencies, vec!["com.example/absent"]);
        assert_eq!(result.unsatisfied_versions, vec!["com.example/old"]);
        assert!(result.section.has_warning_containing(
            "Dependency com.example/old requires >=1.0.0 but registry has 0.9.0"
        ));
        assert!(result.section.has_warning_containing(
            "Dependency artifact not found in registry: com.example/absent"
        ));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        let result = DependencyValidator::default().validate_dependencies(
            &manifest("artifact-a", json!([{"artifact": "artifact-a", "purpose": "loop"}])),
            &mut graph,
        );
        assert!(!result.section.valid);
        assert_eq!(result.circular_dependencies, vec![vec!["artifact-a", "artifact-a"]]);
        assert!(result.section.has_error_containing(
            "Circular dependency detected: artifact-a -> artifact-a"
        ));
    }

    #[test]
    fn test_shared_graph_detects_cross_artifact_cycle() {
        let validator = DependencyValidator::default();
        let mut graph = DependencyGraph::new();

        validator.check_declarations(
            &manifest("artifact-a", json!([{"artifact": "artifact-b", "purpose": "x"}])),
            &mut graph,
        );
        validator.check_declarations(
            &manifest("artifact-b", json!([{"artifact": "artifact-a", "purpose": "y"}])),
            &mut graph,
        );

        assert_eq!(
            graph.find_cycles(),
            vec![vec!["artifact-a", "artifact-b", "artifact-a"]]
        );
    }
}
