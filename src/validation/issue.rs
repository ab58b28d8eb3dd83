use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::FieldPath;

/// Which stage produced an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Parse,
    Structural,
    Naming,
    SemanticType,
    Graph,
    Reference,
    Schema,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Parse => "parse",
            IssueKind::Structural => "structural",
            IssueKind::Naming => "naming",
            IssueKind::SemanticType => "semantic_type",
            IssueKind::Graph => "graph",
            IssueKind::Reference => "reference",
            IssueKind::Schema => "schema",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single error or warning found in an artifact
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct Issue {
    pub kind: IssueKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<FieldPath>,

    pub message: String,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: None,
            message: message.into(),
        }
    }

    pub fn at(kind: IssueKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_serializes_kind_and_path() {
        let issue = Issue::at(
            IssueKind::SemanticType,
            FieldPath::root().key("dependsOn").index(0),
            "schema cannot depend on role. Allowed: manifest, governance",
        );
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "kind": "semantic_type",
                "path": "dependsOn[0]",
                "message": "schema cannot depend on role. Allowed: manifest, governance"
            })
        );
        assert_eq!(issue.to_string(), issue.message);
    }

    #[test]
    fn test_pathless_issue_omits_path() {
        let issue = Issue::new(IssueKind::Graph, "dependsOn must be an array");
        let value = serde_json::to_value(&issue).unwrap();
        assert!(value.get("path").is_none());
    }
}
