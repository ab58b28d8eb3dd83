pub mod dependency;
pub mod naming;
pub mod path;
pub mod registry;
pub mod semantic_type;

pub use dependency::{ArtifactIdentity, DependencyDeclaration};
pub use naming::{ArtifactNameRules, NamespaceFormat, NamingRules, VersionPatterns};
pub use path::{FieldPath, PathSegment};
pub use registry::{ArtifactRegistry, InMemoryRegistry, RegistryEntry, RegistryError};
pub use semantic_type::{SemanticSchemaTable, SemanticType, SemanticTypeSchema};
