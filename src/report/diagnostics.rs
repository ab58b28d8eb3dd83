use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::Document;
use crate::validation::Issue;

/// An issue pointed at its location in the artifact source
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
pub struct IssueDiagnostic {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("{kind}")]
    pub bad_bit: SourceSpan,
    pub kind: String,
    pub message: String,
}

impl IssueDiagnostic {
    /// `None` when the issue has no path or the path has no known span
    pub fn from_issue(document: &Document, issue: &Issue) -> Option<Self> {
        let path = issue.path.as_ref()?;
        let span = document.span_for(path)?;
        Some(Self {
            src: document.named_source(),
            bad_bit: span,
            kind: issue.kind.to_string(),
            message: issue.message.clone(),
        })
    }
}
