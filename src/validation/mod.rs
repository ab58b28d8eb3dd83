mod dependency;
mod engine;
mod issue;
mod naming;
mod reference;
mod result;
mod schema;
mod semantic;
mod structural;

#[cfg(test)]
mod tests;

pub use dependency::{DependencyResult, DependencyValidator, is_valid_version_constraint};
pub use engine::ValidationEngine;
pub use issue::{Issue, IssueKind};
pub use naming::{NamingResult, NamingValidator};
pub use reference::{ReferenceFinding, ReferenceResult, ReferenceValidator, is_valid_reference};
pub use result::SectionResult;
pub use schema::{SchemaError, SchemaValidator};
pub use semantic::{SemanticResult, SemanticTypeValidator};
pub use structural::StructuralValidator;
