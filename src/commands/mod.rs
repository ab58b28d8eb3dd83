mod graph;
mod types;
mod validate;

pub use graph::{GraphArgs, graph_command};
pub use types::{TypesArgs, types_command};
pub use validate::{ValidateArgs, validate_command};

use anyhow::{Context, Result};
use std::path::Path;

use artifact_gate::config::ValidatorConfig;

/// Rules file if given, built-in defaults otherwise
fn load_config(rules: Option<&Path>) -> Result<ValidatorConfig> {
    match rules {
        Some(path) => ValidatorConfig::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}
