use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::dependency::{DependencyResult, DependencyValidator};
use super::issue::{Issue, IssueKind};
use super::naming::{NamingResult, NamingValidator};
use super::reference::{ReferenceResult, ReferenceValidator};
use super::result::SectionResult;
use super::schema::SchemaValidator;
use super::semantic::{SemanticResult, SemanticTypeValidator};
use super::structural::StructuralValidator;
use crate::config::{ConfigError, ValidatorConfig};
use crate::graph::DependencyGraph;
use crate::loader::{Document, DocumentLoader, LoadError};
use crate::models::{ArtifactIdentity, ArtifactRegistry};
use crate::models::dependency::dependency_entries;
use crate::report::{
    BatchValidationResult, ExtendedValidationResult, PerformanceMetrics, ValidationStatus,
};

/// Output of every stage for one artifact
#[derive(Default)]
struct Sections {
    structural: SectionResult,
    schema: Option<SectionResult>,
    semantic: SemanticResult,
    naming: NamingResult,
    dependency: DependencyResult,
    reference: ReferenceResult,
}

/// Runs every validation stage and aggregates the findings into one report
pub struct ValidationEngine {
    config: ValidatorConfig,
    loader: DocumentLoader,
    structural: StructuralValidator,
    naming: NamingValidator,
    semantic: SemanticTypeValidator,
    schema: Option<SchemaValidator>,
    registry: Option<Arc<dyn ArtifactRegistry>>,
}

impl ValidationEngine {
    pub fn new(config: ValidatorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            naming: NamingValidator::new(&config.naming)?,
            semantic: SemanticTypeValidator::new(config.semantic_types.clone()),
            structural: StructuralValidator::new(),
            loader: DocumentLoader::new(),
            schema: None,
            registry: None,
            config,
        })
    }

    pub fn with_registry(mut self, registry: Arc<dyn ArtifactRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_schema(mut self, schema: SchemaValidator) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    fn registry(&self) -> Option<&dyn ArtifactRegistry> {
        self.registry.as_deref()
    }

    pub fn validate_file(&self, path: &Path) -> ExtendedValidationResult {
        match self.loader.load_file(path) {
            Ok(document) => self.validate_document(&document),
            Err(e) => self.load_failure(&path.display().to_string(), e),
        }
    }

    pub fn validate_str(&self, name: &str, content: &str) -> ExtendedValidationResult {
        match self.loader.load_str(name, content) {
            Ok(document) => self.validate_document(&document),
            Err(e) => self.load_failure(name, LoadError::Parse(e)),
        }
    }

    /// Validate one artifact on its own; its graph holds only its own edges
    pub fn validate_document(&self, document: &Document) -> ExtendedValidationResult {
        let start = Instant::now();
        debug!("Validating artifact {}", document.name());
        let sections = self.run_sections(document.root(), None);
        self.assemble(document, sections, start)
    }

    /// Validate artifacts against one shared dependency graph.
    ///
    /// Declarations are added serially, cycle detection runs once over the
    /// finished graph, and every artifact on a cycle gets it reported.
    pub fn validate_batch(&self, documents: &[Document]) -> BatchValidationResult {
        let (graph, dependencies) = self.build_graph(documents);
        let cycles = graph.find_cycles();
        if !cycles.is_empty() {
            debug!("Found {} dependency cycles across {} artifacts", cycles.len(), documents.len());
        }

        let pending: Vec<(&Document, DependencyResult)> = documents
            .iter()
            .zip(dependencies)
            .map(|(document, mut dependency)| {
                let id = ArtifactIdentity::of(document.root()).id;
                dependency.attach_cycles(
                    cycles
                        .iter()
                        .filter(|cycle| cycle.contains(&id))
                        .cloned()
                        .collect(),
                );
                (document, dependency)
            })
            .collect();

        let finish = |(document, dependency): (&Document, DependencyResult)| {
            let start = Instant::now();
            let sections = self.run_sections(document.root(), Some(dependency));
            self.assemble(document, sections, start)
        };

        let results: Vec<ExtendedValidationResult> = if self.config.parallel {
            pending.into_par_iter().map(finish).collect()
        } else {
            pending.into_iter().map(finish).collect()
        };

        BatchValidationResult::new(results, cycles)
    }

    /// Load and validate files as one batch; unloadable files fail on their own
    pub fn validate_batch_files(&self, paths: &[PathBuf]) -> BatchValidationResult {
        let mut documents = Vec::new();
        let mut slots: Vec<Result<usize, ExtendedValidationResult>> = Vec::new();

        for path in paths {
            match self.loader.load_file(path) {
                Ok(document) => {
                    slots.push(Ok(documents.len()));
                    documents.push(document);
                }
                Err(e) => slots.push(Err(self.load_failure(&path.display().to_string(), e))),
            }
        }

        let batch = self.validate_batch(&documents);
        let mut validated: Vec<Option<ExtendedValidationResult>> =
            batch.results.into_iter().map(Some).collect();

        let results = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Ok(index) => validated.get_mut(index).and_then(Option::take),
                Err(failure) => Some(failure),
            })
            .collect();

        BatchValidationResult::new(results, batch.circular_dependencies)
    }

    /// Add every document's declarations to one graph.
    ///
    /// All artifacts are registered before any edge is added, so a target
    /// resolves to the artifact with that exact id wherever it sits in the batch.
    pub fn build_graph(&self, documents: &[Document]) -> (DependencyGraph, Vec<DependencyResult>) {
        let validator = DependencyValidator::new(self.registry());
        let mut graph = DependencyGraph::new();
        for document in documents {
            let identity = ArtifactIdentity::of(document.root());
            graph.add_artifact(&identity.id, &identity.aliases);
        }
        let results = documents
            .iter()
            .map(|document| validator.check_declarations(document.root(), &mut graph))
            .collect();
        (graph, results)
    }

    fn run_sections(&self, artifact: &Value, precomputed: Option<DependencyResult>) -> Sections {
        let registry = self.registry();
        let references = ReferenceValidator::new(&self.config.reference_suffixes, registry);
        let run_dependency = || {
            precomputed.unwrap_or_else(|| {
                let mut graph = DependencyGraph::new();
                DependencyValidator::new(registry).validate_dependencies(artifact, &mut graph)
            })
        };

        if !self.config.parallel {
            return Sections {
                structural: self.structural.validate(artifact),
                schema: self.schema.as_ref().map(|s| s.validate(artifact)),
                semantic: self.semantic.validate(artifact),
                naming: self.naming.validate(artifact),
                dependency: run_dependency(),
                reference: references.validate(artifact),
            };
        }

        let mut sections = Sections::default();
        {
            let Sections {
                structural,
                schema,
                semantic,
                naming,
                dependency,
                reference,
            } = &mut sections;

            rayon::scope(|s| {
                s.spawn(|_| *structural = self.structural.validate(artifact));
                s.spawn(|_| *schema = self.schema.as_ref().map(|v| v.validate(artifact)));
                s.spawn(|_| *semantic = self.semantic.validate(artifact));
                s.spawn(|_| *naming = self.naming.validate(artifact));
                s.spawn(|_| *dependency = run_dependency());
                s.spawn(|_| *reference = references.validate(artifact));
            });
        }
        sections
    }

    fn assemble(&self, document: &Document, sections: Sections, start: Instant) -> ExtendedValidationResult {
        let strict = self.config.strict;
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // Fixed section order keeps reports stable regardless of scheduling
        let merged: [&SectionResult; 6] = [
            &sections.structural,
            sections.schema.as_ref().unwrap_or(&EMPTY_SECTION),
            &sections.semantic.section,
            &sections.naming.section,
            &sections.dependency.section,
            &sections.reference.section,
        ];
        for section in merged {
            errors.extend(section.errors.iter().cloned());
            warnings.extend(section.warnings.iter().cloned());
        }

        let status = ValidationStatus::from_counts(errors.len(), warnings.len(), strict);
        if strict {
            errors.extend(warnings.iter().cloned());
        }

        let artifact = document.root();
        let performance_metrics = PerformanceMetrics {
            validation_time_seconds: start.elapsed().as_secs_f64(),
            dependency_count: dependency_entries(artifact).map_or(0, Vec::len),
            reference_count: sections.reference.references.len(),
            broken_reference_count: sections.reference.broken_references.len(),
        };

        match status {
            ValidationStatus::Passed => info!("✓ Artifact validation passed: {}", document.name()),
            _ => debug!(
                "Artifact {} {status}: {} errors, {} warnings",
                document.name(),
                errors.len(),
                warnings.len()
            ),
        }

        ExtendedValidationResult {
            status,
            artifact_path: document.name().to_string(),
            artifact_type: document
                .kind()
                .unwrap_or(ExtendedValidationResult::UNKNOWN_TYPE)
                .to_string(),
            strict,
            errors,
            warnings,
            circular_dependency_detected: !sections.dependency.circular_dependencies.is_empty(),
            structural_results: Some(sections.structural),
            schema_results: sections.schema,
            semantic_results: Some(sections.semantic),
            naming_results: Some(sections.naming),
            dependency_results: Some(sections.dependency),
            reference_results: Some(sections.reference),
            performance_metrics,
            document: Some(document.clone()),
            parse_error: None,
        }
    }

    fn load_failure(&self, name: &str, error: LoadError) -> ExtendedValidationResult {
        let message = match &error {
            LoadError::Io { path, source } => {
                format!("Failed to read artifact {}: {source}", path.display())
            }
            LoadError::Parse(e) => e.to_string(),
        };
        debug!("Load failed for {name}: {message}");

        let mut result = ExtendedValidationResult::load_failure(
            name,
            Issue::new(IssueKind::Parse, message),
            self.config.strict,
        );
        if let LoadError::Parse(e) = error {
            result.parse_error = Some(e);
        }
        result
    }
}

static EMPTY_SECTION: SectionResult = SectionResult {
    valid: true,
    errors: Vec::new(),
    warnings: Vec::new(),
};
