use anyhow::{Context, Result};
use clap::Args;
use miette::Report;
use std::path::PathBuf;

use artifact_gate::graph::to_dot;
use artifact_gate::loader::FileScanner;
use artifact_gate::validation::ValidationEngine;

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Artifact files, or directories to search for artifacts
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Write the DOT output to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a dependency-first order instead of DOT
    #[arg(long)]
    order: bool,

    /// Rules file overriding the built-in tables
    #[arg(long)]
    rules: Option<PathBuf>,
}

pub fn graph_command(args: GraphArgs) -> Result<()> {
    let config = super::load_config(args.rules.as_deref())?;
    let engine = ValidationEngine::new(config).context("Invalid validation rules")?;

    let mut documents = Vec::new();
    for path in FileScanner::collect(&args.paths)? {
        match engine.loader().load_file(&path) {
            Ok(document) => documents.push(document),
            Err(e) => {
                eprintln!("{:?}", Report::new(e));
                anyhow::bail!("Failed to load artifact {}", path.display());
            }
        }
    }

    if documents.is_empty() {
        println!("No artifacts found.");
        return Ok(());
    }

    let (graph, _) = engine.build_graph(&documents);

    if args.order {
        let order = graph.topological_sort().map_err(|e| {
            let cycles: Vec<String> = graph
                .find_cycles()
                .iter()
                .map(|cycle| cycle.join(" -> "))
                .collect();
            anyhow::anyhow!("{e}: {}", cycles.join("; "))
        })?;
        for id in order {
            println!("{id}");
        }
        return Ok(());
    }

    let dot_output = to_dot(&graph);
    if let Some(path) = args.output {
        std::fs::write(&path, &dot_output)
            .with_context(|| format!("Failed to write graph to {}", path.display()))?;
        println!("Graph saved to: {}", path.display());
    } else {
        print!("{dot_output}");
    }

    Ok(())
}
