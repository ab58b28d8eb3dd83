use serde::{Deserialize, Serialize};

/// Naming rules applied to namespaces, artifact names and versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRules {
    pub namespace_formats: Vec<NamespaceFormat>,

    #[serde(default)]
    pub reserved_namespaces: Vec<String>,

    pub artifact_name: ArtifactNameRules,

    pub versions: VersionPatterns,
}

impl NamingRules {
    pub fn builtin() -> Self {
        crate::defaults::DEFAULT_NAMING_RULES.clone()
    }
}

impl Default for NamingRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A reverse-DNS namespace family such as `io.github.*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceFormat {
    pub prefix: String,
    pub pattern: String,

    #[serde(default)]
    pub verification_required: bool,

    #[serde(default)]
    pub verification_methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactNameRules {
    pub pattern: String,
    pub min_length: usize,
    pub max_length: usize,

    #[serde(default)]
    pub reserved_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPatterns {
    pub release: String,
    pub prerelease: String,
    pub build: String,
}
