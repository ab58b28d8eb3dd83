use serde::Serialize;

use super::issue::{Issue, IssueKind};
use crate::models::FieldPath;

/// Outcome of one validation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionResult {
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl Default for SectionResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl SectionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_error(&mut self, issue: Issue) {
        self.valid = false;
        self.errors.push(issue);
    }

    pub fn push_warning(&mut self, issue: Issue) {
        self.warnings.push(issue);
    }

    pub fn error(&mut self, kind: IssueKind, path: Option<FieldPath>, message: impl Into<String>) {
        self.push_error(Issue {
            kind,
            path,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, kind: IssueKind, path: Option<FieldPath>, message: impl Into<String>) {
        self.push_warning(Issue {
            kind,
            path,
            message: message.into(),
        });
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.message.contains(needle))
    }

    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.message.contains(needle))
    }
}
