use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;

use commands::{GraphArgs, TypesArgs, ValidateArgs};

#[derive(Parser)]
#[command(
    name = "artifact-gate",
    about = "Validates structured configuration artifacts before they enter a governed registry",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate artifact files or directories of artifacts
    Validate(ValidateArgs),

    /// Print the dependency graph of a set of artifacts
    Graph(GraphArgs),

    /// List the semantic types and their field rules
    Types(TypesArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate(args) => commands::validate_command(args),
        Commands::Graph(args) => {
            commands::graph_command(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Types(args) => {
            commands::types_command(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("artifact_gate=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("artifact_gate=info"), // -v: info messages
        _ => EnvFilter::new("artifact_gate=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
