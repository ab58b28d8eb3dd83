//! Aggregated validation results and their renderings

mod diagnostics;
mod text;

use serde::Serialize;
use std::fmt;

pub use diagnostics::IssueDiagnostic;
pub use text::{TextOptions, render_batch, render_result};

use crate::loader::{Document, ParseError};
use crate::validation::{
    DependencyResult, Issue, NamingResult, ReferenceResult, SectionResult, SemanticResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Passed,
    Warning,
    Failed,
}

impl ValidationStatus {
    /// Status for a merged set of findings.
    ///
    /// Strict mode turns any warning into a failure.
    pub fn from_counts(errors: usize, warnings: usize, strict: bool) -> Self {
        if errors > 0 || (warnings > 0 && strict) {
            ValidationStatus::Failed
        } else if warnings > 0 {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Passed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Passed => "passed",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub validation_time_seconds: f64,
    pub dependency_count: usize,
    pub reference_count: usize,
    pub broken_reference_count: usize,
}

/// Everything known about one validated artifact
#[derive(Debug, Clone, Serialize)]
pub struct ExtendedValidationResult {
    pub status: ValidationStatus,
    pub artifact_path: String,
    pub artifact_type: String,
    pub strict: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_results: Option<SectionResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_results: Option<SectionResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_results: Option<SemanticResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_results: Option<NamingResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_results: Option<DependencyResult>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_results: Option<ReferenceResult>,

    pub circular_dependency_detected: bool,
    pub performance_metrics: PerformanceMetrics,

    /// Source the issues point into, kept for diagnostics
    #[serde(skip)]
    pub document: Option<Document>,

    #[serde(skip)]
    pub parse_error: Option<ParseError>,
}

impl ExtendedValidationResult {
    pub const UNKNOWN_TYPE: &'static str = "Unknown";

    /// A result for an artifact that could not be loaded at all
    pub fn load_failure(artifact_path: &str, issue: Issue, strict: bool) -> Self {
        Self {
            status: ValidationStatus::Failed,
            artifact_path: artifact_path.to_string(),
            artifact_type: Self::UNKNOWN_TYPE.to_string(),
            strict,
            errors: vec![issue],
            warnings: Vec::new(),
            structural_results: None,
            schema_results: None,
            semantic_results: None,
            naming_results: None,
            dependency_results: None,
            reference_results: None,
            circular_dependency_detected: false,
            performance_metrics: PerformanceMetrics::default(),
            document: None,
            parse_error: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Passed
    }

    pub fn is_failure(&self) -> bool {
        self.status == ValidationStatus::Failed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub warning: usize,
    pub failed: usize,
}

/// Results for a set of artifacts validated against one shared graph
#[derive(Debug, Clone, Serialize)]
pub struct BatchValidationResult {
    pub status: ValidationStatus,
    pub summary: BatchSummary,
    pub circular_dependencies: Vec<Vec<String>>,
    pub results: Vec<ExtendedValidationResult>,
}

impl BatchValidationResult {
    pub fn new(results: Vec<ExtendedValidationResult>, circular_dependencies: Vec<Vec<String>>) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        for result in &results {
            match result.status {
                ValidationStatus::Passed => summary.passed += 1,
                ValidationStatus::Warning => summary.warning += 1,
                ValidationStatus::Failed => summary.failed += 1,
            }
        }

        // Worst artifact status wins
        let status = results
            .iter()
            .map(|r| r.status)
            .max()
            .unwrap_or(ValidationStatus::Passed);

        Self {
            status,
            summary,
            circular_dependencies,
            results,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ValidationStatus::Failed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
