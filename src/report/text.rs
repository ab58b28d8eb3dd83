use colored::Colorize;
use std::fmt::Write;

use super::{BatchValidationResult, ExtendedValidationResult, ValidationStatus};
use crate::validation::{Issue, SectionResult};

const RULE_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    pub show_metrics: bool,
}

fn status_label(status: ValidationStatus) -> String {
    let label = status.as_str().to_uppercase();
    match status {
        ValidationStatus::Passed => label.green().bold().to_string(),
        ValidationStatus::Warning => label.yellow().bold().to_string(),
        ValidationStatus::Failed => label.red().bold().to_string(),
    }
}

fn describe(issue: &Issue) -> String {
    match &issue.path {
        Some(path) if !path.is_root() => format!("[{}] {}: {}", issue.kind, path, issue.message),
        _ => format!("[{}] {}", issue.kind, issue.message),
    }
}

fn render_section(out: &mut String, name: &str, section: &SectionResult) {
    let _ = writeln!(out, "\n{}:", name.bold());
    if section.valid {
        let _ = writeln!(out, "  {} {name} validation passed", "✓".green());
    } else {
        let _ = writeln!(out, "  {} {name} validation failed", "✗".red());
    }
    for error in &section.errors {
        let _ = writeln!(out, "    {} {}", "✗".red(), error.message);
    }
    for warning in &section.warnings {
        let _ = writeln!(out, "    {} {}", "!".yellow(), warning.message);
    }
}

/// Human-readable report for one artifact
pub fn render_result(result: &ExtendedValidationResult, options: &TextOptions) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Artifact Validation Report");
    let _ = writeln!(out, "{rule}\n");
    let _ = writeln!(out, "Artifact: {}", result.artifact_path);
    let _ = writeln!(out, "Type: {}", result.artifact_type);
    let _ = writeln!(out, "Status: {}", status_label(result.status));
    if result.strict {
        let _ = writeln!(out, "Mode: strict");
    }

    if options.show_metrics {
        let metrics = &result.performance_metrics;
        let _ = writeln!(out, "\nPerformance Metrics:");
        let _ = writeln!(out, "  - validation_time_seconds: {:.6}", metrics.validation_time_seconds);
        let _ = writeln!(out, "  - dependency_count: {}", metrics.dependency_count);
        let _ = writeln!(out, "  - reference_count: {}", metrics.reference_count);
        let _ = writeln!(out, "  - broken_reference_count: {}", metrics.broken_reference_count);
    }

    let sections: [(&str, Option<&SectionResult>); 6] = [
        ("Structure", result.structural_results.as_ref()),
        ("Schema", result.schema_results.as_ref()),
        ("Semantic Types", result.semantic_results.as_ref().map(|r| &r.section)),
        ("Naming", result.naming_results.as_ref().map(|r| &r.section)),
        ("Dependencies", result.dependency_results.as_ref().map(|r| &r.section)),
        ("References", result.reference_results.as_ref().map(|r| &r.section)),
    ];
    for (name, section) in sections {
        if let Some(section) = section {
            render_section(&mut out, name, section);
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(out, "\n{} ({}):", "Errors".red().bold(), result.errors.len());
        for error in &result.errors {
            let _ = writeln!(out, "  - {}", describe(error));
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n{} ({}):", "Warnings".yellow().bold(), result.warnings.len());
        for warning in &result.warnings {
            let _ = writeln!(out, "  - {}", describe(warning));
        }
    }

    if result.circular_dependency_detected {
        let _ = writeln!(out, "\n{}", "Circular dependencies detected!".red().bold());
    }

    let verdict = match result.status {
        ValidationStatus::Passed => "All validations passed!".green().to_string(),
        ValidationStatus::Warning => "Validation passed with warnings".yellow().to_string(),
        ValidationStatus::Failed => "Validation failed!".red().to_string(),
    };
    let _ = writeln!(out, "\n{verdict}");
    let _ = writeln!(out, "\n{rule}");
    out
}

/// Every artifact report followed by a one-line summary
pub fn render_batch(batch: &BatchValidationResult, options: &TextOptions) -> String {
    let mut out = String::new();
    for result in &batch.results {
        out.push_str(&render_result(result, options));
        out.push('\n');
    }

    if !batch.circular_dependencies.is_empty() {
        let _ = writeln!(out, "{}", "Dependency cycles:".red().bold());
        for cycle in &batch.circular_dependencies {
            let _ = writeln!(out, "  - {}", cycle.join(" -> "));
        }
        out.push('\n');
    }

    let summary = &batch.summary;
    let _ = writeln!(
        out,
        "Validated {} artifacts: {} passed, {} with warnings, {} failed ({})",
        summary.total,
        summary.passed,
        summary.warning,
        summary.failed,
        status_label(batch.status)
    );
    out
}
