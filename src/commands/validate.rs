use anyhow::{Context, Result};
use clap::Args;
use miette::Report;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use artifact_gate::loader::FileScanner;
use artifact_gate::models::InMemoryRegistry;
use artifact_gate::report::{
    ExtendedValidationResult, IssueDiagnostic, TextOptions, render_batch, render_result,
};
use artifact_gate::validation::{SchemaValidator, ValidationEngine};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Artifact files, or directories to search for .yaml/.yml/.json artifacts
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Registry file mapping artifact ids to {version, type}
    #[arg(long)]
    registry: Option<PathBuf>,

    /// JSON Schema (YAML or JSON) every artifact must satisfy
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Rules file overriding the built-in naming and semantic type tables
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long, env = "ARTIFACT_GATE_STRICT")]
    strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Include performance metrics in text output
    #[arg(long)]
    show_metrics: bool,

    /// Run validators one after another instead of on the thread pool
    #[arg(long)]
    sequential: bool,
}

pub fn validate_command(args: ValidateArgs) -> Result<ExitCode> {
    let mut config = super::load_config(args.rules.as_deref())?;
    if args.strict {
        config.strict = true;
    }
    if args.sequential {
        config.parallel = false;
    }

    let mut engine = ValidationEngine::new(config).context("Invalid validation rules")?;

    if let Some(path) = &args.registry {
        let registry = InMemoryRegistry::load(path)
            .with_context(|| format!("Failed to load registry {}", path.display()))?;
        info!("Loaded {} registry entries from {}", registry.len(), path.display());
        engine = engine.with_registry(Arc::new(registry));
    }

    if let Some(path) = &args.schema {
        let schema = SchemaValidator::load(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?;
        engine = engine.with_schema(schema);
    }

    let files = FileScanner::collect(&args.paths)?;
    if files.is_empty() {
        anyhow::bail!("No artifact files found in the given paths");
    }

    let options = TextOptions {
        show_metrics: args.show_metrics,
    };

    let failed = if let [file] = files.as_slice() {
        let result = engine.validate_file(file);
        match args.format {
            OutputFormat::Json => println!("{}", result.to_json()?),
            OutputFormat::Text => {
                print_diagnostics(&result);
                print!("{}", render_result(&result, &options));
            }
        }
        result.is_failure()
    } else {
        let batch = engine.validate_batch_files(&files);
        match args.format {
            OutputFormat::Json => println!("{}", batch.to_json()?),
            OutputFormat::Text => {
                for result in &batch.results {
                    print_diagnostics(result);
                }
                print!("{}", render_batch(&batch, &options));
            }
        }
        batch.is_failure()
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Annotated source snippets for every error that maps to a location
fn print_diagnostics(result: &ExtendedValidationResult) {
    if let Some(parse_error) = &result.parse_error {
        eprintln!("{:?}", Report::new(parse_error.clone()));
        return;
    }

    let Some(document) = &result.document else {
        return;
    };
    for error in &result.errors {
        if let Some(diagnostic) = IssueDiagnostic::from_issue(document, error) {
            eprintln!("{:?}", Report::new(diagnostic));
        }
    }
}
