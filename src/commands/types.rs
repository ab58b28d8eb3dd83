use anyhow::Result;
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Rules file overriding the built-in tables
    #[arg(long)]
    rules: Option<PathBuf>,
}

fn join(fields: &BTreeSet<String>) -> String {
    if fields.is_empty() {
        "(none)".to_string()
    } else {
        fields.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

pub fn types_command(args: TypesArgs) -> Result<()> {
    let config = super::load_config(args.rules.as_deref())?;

    println!("Semantic types:");
    for (semantic_type, schema) in config.semantic_types.iter() {
        let depends_on = schema.allowed_dependencies();
        println!("\n  {semantic_type}");
        println!("    required: {}", join(&schema.required_fields));
        println!("    optional: {}", join(&schema.optional_fields));
        println!(
            "    can depend on: {}",
            if depends_on.is_empty() { "(none)" } else { &depends_on }
        );
    }

    Ok(())
}
