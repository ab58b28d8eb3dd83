use super::*;
use crate::config::ValidatorConfig;
use crate::loader::DocumentLoader;
use crate::models::{InMemoryRegistry, RegistryEntry};
use crate::report::ValidationStatus;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn engine() -> ValidationEngine {
    ValidationEngine::new(ValidatorConfig::default()).unwrap()
}

fn strict_engine() -> ValidationEngine {
    ValidationEngine::new(ValidatorConfig::default().strict(true)).unwrap()
}

fn minimal_manifest(name: &str) -> String {
    format!(
        r#"
apiVersion: v1
kind: Manifest
metadata:
  name: {name}
  version: 1.0.0
  semanticType: manifest
spec: {{}}
dependsOn:
  - artifact: a
    purpose: config
"#
    )
}

#[test]
fn test_engine_creation() {
    let engine = ValidationEngine::new(ValidatorConfig::default());
    assert!(engine.is_ok());
}

#[test]
fn test_minimal_manifest_passes() {
    let result = engine().validate_str("manifest.yaml", &minimal_manifest("artifact-a"));

    assert_eq!(result.status, ValidationStatus::Passed, "{:?}", result.errors);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
    assert_eq!(result.artifact_type, "Manifest");
    assert_eq!(result.performance_metrics.dependency_count, 1);
    assert!(!result.circular_dependency_detected);
    assert!(result.schema_results.is_none());
}

#[test]
fn test_reserved_name_warns_and_fails_strict() {
    let result = engine().validate_str("manifest.yaml", &minimal_manifest("mcp"));
    assert_eq!(result.status, ValidationStatus::Warning);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].message, "Artifact name uses reserved word: mcp");
    assert_eq!(result.warnings[0].kind, IssueKind::Naming);

    let strict = strict_engine().validate_str("manifest.yaml", &minimal_manifest("mcp"));
    assert_eq!(strict.status, ValidationStatus::Failed);
    assert!(strict.strict);
    assert_eq!(strict.errors, strict.warnings);
}

#[test]
fn test_strict_mode_is_monotonic() {
    let samples = [
        minimal_manifest("artifact-a"),
        minimal_manifest("mcp"),
        minimal_manifest("Bad Name"),
    ];
    for sample in &samples {
        let lenient = engine().validate_str("sample.yaml", sample);
        let strict = strict_engine().validate_str("sample.yaml", sample);
        assert!(strict.status >= lenient.status);
        if lenient.is_failure() {
            assert!(strict.is_failure());
        }
    }
}

#[test]
fn test_missing_top_level_field_yields_one_structural_error() {
    let content = r#"
apiVersion: v1
metadata:
  name: artifact-a
  version: 1.0.0
  semanticType: manifest
spec: {}
"#;
    let result = engine().validate_str("manifest.yaml", content);

    let structural: Vec<_> = result
        .errors
        .iter()
        .filter(|e| e.kind == IssueKind::Structural)
        .collect();
    assert_eq!(structural.len(), 1);
    assert_eq!(structural[0].message, "Missing required field: kind");
    assert_eq!(result.status, ValidationStatus::Failed);
    assert_eq!(result.artifact_type, "Unknown");
}

#[test]
fn test_invalid_namespace_fails() {
    let content = r#"
apiVersion: v1
kind: Manifest
metadata:
  name: artifact-a
  version: 1.0.0
  semanticType: manifest
  namingRegistry:
    format: reverse-DNS
    namespace: invalid_namespace
spec: {}
"#;
    let result = engine().validate_str("manifest.yaml", content);
    let naming = result.naming_results.as_ref().unwrap();

    assert!(!naming.section.valid);
    assert!(naming.section.has_error_containing("Invalid namespace format"));
    assert_eq!(result.status, ValidationStatus::Failed);
}

#[test]
fn test_unverified_namespace_warns() {
    let content = r#"
apiVersion: v1
kind: Manifest
metadata:
  name: artifact-a
  version: 1.0.0
  semanticType: manifest
  namingRegistry:
    format: reverse-DNS
    namespace: io.github.someone
spec: {}
"#;
    let result = engine().validate_str("manifest.yaml", content);
    assert_eq!(result.status, ValidationStatus::Warning);
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.message == "Namespace io.github.someone requires verification")
    );
}

#[test]
fn test_parse_error_short_circuits() {
    let result = engine().validate_str("broken.yaml", "metadata: [unclosed\n");

    assert_eq!(result.status, ValidationStatus::Failed);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, IssueKind::Parse);
    assert!(result.structural_results.is_none());
    assert!(result.dependency_results.is_none());
    assert!(result.parse_error.is_some());
}

#[test]
fn test_sections_merge_in_fixed_order() {
    let content = r#"
apiVersion: v1
kind: Policy
metadata:
  name: ab
  version: 1.0.0
  semanticType: policy
rules: []
dependsOn: nope
spec:
  schemaRef: not-a-reference
"#;
    let result = engine().validate_str("policy.yaml", content);
    let kinds: Vec<IssueKind> = result.errors.iter().map(|e| e.kind).collect();

    assert_eq!(
        kinds,
        vec![
            IssueKind::SemanticType,
            IssueKind::Naming,
            IssueKind::Graph,
            IssueKind::Reference
        ]
    );
    assert_eq!(result.performance_metrics.reference_count, 1);
    assert_eq!(result.performance_metrics.broken_reference_count, 1);
    assert_eq!(result.performance_metrics.dependency_count, 0);
}

#[test]
fn test_sequential_matches_parallel() {
    let content = minimal_manifest("mcp");
    let parallel = engine().validate_str("m.yaml", &content);
    let sequential = ValidationEngine::new(ValidatorConfig::default().parallel(false))
        .unwrap()
        .validate_str("m.yaml", &content);

    assert_eq!(parallel.status, sequential.status);
    assert_eq!(parallel.errors, sequential.errors);
    assert_eq!(parallel.warnings, sequential.warnings);
}

#[test]
fn test_registry_checks() {
    let registry = InMemoryRegistry::new()
        .with("com.example/schema", RegistryEntry::new("1.0.0", "schema"));
    let engine = engine().with_registry(Arc::new(registry));

    let content = r#"
apiVersion: v1
kind: Manifest
metadata:
  name: artifact-a
  version: 1.0.0
  semanticType: manifest
spec:
  schemaRef: com.example/schema:1.0.0
  policyRef: com.example/policy
dependsOn:
  - artifact: com.example/schema
    purpose: shape
    version: ^1.0.0
  - artifact: com.example/missing
    purpose: other
"#;
    let result = engine.validate_str("manifest.yaml", content);

    assert_eq!(result.status, ValidationStatus::Warning);
    let dependency = result.dependency_results.as_ref().unwrap();
    assert_eq!(dependency.missing_dependencies, vec!["com.example/missing"]);
    let reference = result.reference_results.as_ref().unwrap();
    assert_eq!(reference.missing_targets.len(), 1);
    assert_eq!(reference.missing_targets[0].value, json!("com.example/policy"));
}

#[test]
fn test_schema_section() {
    let schema = SchemaValidator::new(
        "inline",
        &json!({"type": "object", "required": ["owner"]}),
    )
    .unwrap();
    let engine = engine().with_schema(schema);

    let result = engine.validate_str("manifest.yaml", &minimal_manifest("artifact-a"));
    let schema_results = result.schema_results.as_ref().unwrap();
    assert!(!schema_results.valid);
    assert_eq!(result.errors[0].kind, IssueKind::Schema);
    assert_eq!(result.status, ValidationStatus::Failed);
}

fn manifest_doc(file: &str, metadata: &str, depends_on: &str) -> crate::loader::Document {
    let content = format!(
        "apiVersion: v1\nkind: Manifest\nmetadata: {metadata}\nspec: {{}}\ndependsOn:\n  - {{artifact: {depends_on}, purpose: uses}}\n"
    );
    DocumentLoader::new().load_str(file, &content).unwrap()
}

#[test]
fn test_bare_name_does_not_share_namespaced_node() {
    let x = manifest_doc(
        "x.yaml",
        "{name: tool, version: 1.0.0, semanticType: manifest, namingRegistry: {format: reverse-DNS, namespace: com.alpha, verificationStatus: verified}}",
        "leaf",
    );
    let y = manifest_doc(
        "y.yaml",
        "{name: tool, version: 1.0.0, semanticType: manifest}",
        "middle",
    );
    let m = manifest_doc(
        "m.yaml",
        "{name: middle, version: 1.0.0, semanticType: manifest}",
        "com.alpha/tool",
    );

    for documents in [
        vec![x.clone(), y.clone(), m.clone()],
        vec![y.clone(), m.clone(), x.clone()],
    ] {
        let engine = engine();
        let (graph, _) = engine.build_graph(&documents);
        assert_eq!(graph.get_dependencies("com.alpha/tool"), vec!["leaf"]);
        assert_eq!(graph.get_dependencies("tool"), vec!["middle"]);
        assert_eq!(graph.get_dependencies("middle"), vec!["com.alpha/tool"]);
        assert!(graph.find_cycles().is_empty());

        let batch = engine.validate_batch(&documents);
        assert!(batch.circular_dependencies.is_empty());
        for result in &batch.results {
            assert!(!result.circular_dependency_detected, "{}", result.artifact_path);
            assert_eq!(result.status, ValidationStatus::Passed, "{:?}", result.warnings);
        }
    }
}

#[test]
fn test_batch_cycle_detected() {
    let loader = DocumentLoader::new();
    let a = loader
        .load_str(
            "a.yaml",
            r#"
apiVersion: v1
kind: Manifest
metadata: {name: artifact-a, version: 1.0.0, semanticType: manifest}
spec: {}
dependsOn:
  - {artifact: artifact-b, purpose: uses}
"#,
        )
        .unwrap();
    let b = loader
        .load_str(
            "b.yaml",
            r#"
apiVersion: v1
kind: Manifest
metadata: {name: artifact-b, version: 1.0.0, semanticType: manifest}
spec: {}
dependsOn:
  - {artifact: artifact-a, purpose: uses}
"#,
        )
        .unwrap();

    let batch = engine().validate_batch(&[a, b]);

    assert_eq!(batch.status, ValidationStatus::Failed);
    assert_eq!(
        batch.circular_dependencies,
        vec![vec!["artifact-a", "artifact-b", "artifact-a"]]
    );
    for result in &batch.results {
        assert!(result.circular_dependency_detected);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message == "Circular dependency detected: artifact-a -> artifact-b -> artifact-a")
        );
    }
}

#[test]
fn test_acyclic_batch_passes() {
    let loader = DocumentLoader::new();
    let docs: Vec<_> = [("artifact-a", "artifact-b"), ("artifact-b", "artifact-c")]
        .iter()
        .map(|(name, dep)| {
            loader
                .load_str(
                    &format!("{name}.yaml"),
                    &format!(
                        "apiVersion: v1\nkind: Manifest\nmetadata: {{name: {name}, version: 1.0.0, semanticType: manifest}}\nspec: {{}}\ndependsOn: [{{artifact: {dep}, purpose: uses}}]\n"
                    ),
                )
                .unwrap()
        })
        .collect();

    let batch = engine().validate_batch(&docs);
    assert_eq!(batch.status, ValidationStatus::Passed);
    assert!(batch.circular_dependencies.is_empty());

    let (graph, _) = engine().build_graph(&docs);
    assert_eq!(
        graph.topological_sort().unwrap(),
        vec!["artifact-c", "artifact-b", "artifact-a"]
    );
}

#[test]
fn test_validate_batch_files_keeps_order_and_load_failures() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.yaml");
    let bad = temp_dir.path().join("bad.yaml");
    fs::write(&good, minimal_manifest("artifact-a")).unwrap();
    fs::write(&bad, "- not\n- a mapping\n").unwrap();

    let batch = engine().validate_batch_files(&[bad.clone(), good.clone()]);

    assert_eq!(batch.results.len(), 2);
    assert_eq!(batch.results[0].artifact_path, bad.display().to_string());
    assert!(batch.results[0].is_failure());
    assert!(batch.results[1].passed());
    assert_eq!(batch.status, ValidationStatus::Failed);
    assert_eq!(batch.summary.failed, 1);
    assert_eq!(batch.summary.passed, 1);
}

#[test]
fn test_json_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("schema.json");
    fs::write(
        &path,
        r#"{
  "apiVersion": "v1",
  "kind": "Schema",
  "metadata": {"name": "artifact-schema", "version": "2.0.0-rc1", "semanticType": "schema"},
  "schema": {"type": "object"}
}"#,
    )
    .unwrap();

    let result = engine().validate_file(&path);
    assert_eq!(result.status, ValidationStatus::Warning);
    assert_eq!(result.warnings[0].message, "Using prerelease version");
}
