//! Loads artifact documents from files or strings

mod file_scanner;
mod span_index;

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub use self::file_scanner::FileScanner;
pub use self::span_index::{SpanIndex, SpanInfo};
use crate::error_utils::{create_named_source, format_error_path, span_from_range};
use crate::models::FieldPath;

/// Malformed input. Fatal for the whole validation run.
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("Failed to parse artifact {name}: {message}")]
#[diagnostic(code(artifact_gate::parse))]
pub struct ParseError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    pub name: String,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

#[derive(Error, Debug, Diagnostic)]
pub enum LoadError {
    #[error("Failed to read artifact {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

/// A parsed artifact: the value tree plus what is needed to point back into the source
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    origin: Option<PathBuf>,
    source: String,
    root: Value,
    spans: SpanIndex,
}

impl Document {
    /// Wrap an already-parsed value; no source spans are available
    pub fn from_value(name: &str, root: Value) -> Result<Self, ParseError> {
        let source = serde_yaml::to_string(&root).unwrap_or_default();
        if !root.is_object() {
            return Err(ParseError {
                src: create_named_source(name, &source),
                span: None,
                name: name.to_string(),
                message: format!("artifact root must be a mapping, found {}", kind_of(&root)),
                line: None,
                column: None,
            });
        }

        Ok(Self {
            name: name.to_string(),
            origin: None,
            source,
            root,
            spans: SpanIndex::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Top-level fields; the root is always a mapping
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.root.as_object()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    pub fn kind(&self) -> Option<&str> {
        self.get("kind").and_then(Value::as_str)
    }

    pub fn metadata_str(&self, field: &str) -> Option<&str> {
        self.get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }

    /// Span of the node at `path`, falling back to its closest indexed ancestor
    pub fn span_for(&self, path: &FieldPath) -> Option<SourceSpan> {
        let pointer = path.to_pointer();
        let mut candidate = pointer.as_str();
        loop {
            if let Some(info) = self.spans.get(candidate) {
                return Some(span_from_range(info.start, info.end));
            }
            match candidate.rfind('/') {
                Some(idx) => candidate = &candidate[..idx],
                None => return None,
            }
        }
    }

    pub fn named_source(&self) -> NamedSource<String> {
        let label = match &self.origin {
            Some(path) => format_error_path(path),
            None => self.name.clone(),
        };
        create_named_source(&label, &self.source)
    }
}

/// Parses YAML or JSON artifacts into [`Document`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_file(&self, path: &Path) -> Result<Document, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut document = self.parse(&path.display().to_string(), Some(path), content)?;
        document.origin = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn load_str(&self, name: &str, content: &str) -> Result<Document, ParseError> {
        self.parse(name, None, content.to_string())
    }

    fn parse(&self, name: &str, origin: Option<&Path>, content: String) -> Result<Document, ParseError> {
        let label = match origin {
            Some(path) => format_error_path(path),
            None => name.to_string(),
        };

        // serde_yaml reports precise error locations; JSON parses as YAML too
        let plain: Value = serde_yaml::from_str(&content).map_err(|e| {
            let location = e.location();
            ParseError {
                src: create_named_source(&label, &content),
                span: location.as_ref().map(|l| SourceSpan::from(l.index())),
                name: name.to_string(),
                message: e.to_string(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
            }
        })?;

        if !plain.is_object() {
            return Err(ParseError {
                src: create_named_source(&label, &content),
                span: Some(SourceSpan::from(0)),
                name: name.to_string(),
                message: format!("artifact root must be a mapping, found {}", kind_of(&plain)),
                line: Some(1),
                column: Some(1),
            });
        }

        let (root, spans) = match yaml_spanned::from_str(&content) {
            Ok(spanned) => span_index::strip_spans_and_index(&spanned),
            Err(e) => {
                debug!("Span indexing unavailable for {name}: {e}");
                (plain, SpanIndex::new())
            }
        };

        debug!("Loaded artifact {name} ({} top-level fields)", root.as_object().map_or(0, Map::len));

        Ok(Document {
            name: name.to_string(),
            origin: None,
            source: content,
            root,
            spans,
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
