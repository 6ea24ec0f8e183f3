use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use importgraph::config::load_config;
use importgraph::inspector::ImportInspector;
use importgraph::report::{
    format_registry_as_json, format_report_as_text, format_stats, format_stats_as_json,
    relative_path,
};
use importgraph::types::Resolution;

/// Import analysis for Python projects.
#[derive(Parser)]
#[command(name = "importgraph", about = "Import analysis for Python projects")]
struct Cli {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every import and report unimported files and unresolved imports
    Check {
        /// Project path (default: current directory)
        path: Option<String>,
        /// Dump the full module registry as JSON instead of the report
        #[arg(short, long)]
        json: bool,
        /// Interpreter to query for its module search path
        #[arg(long)]
        python: Option<String>,
        /// Extra module search location (repeatable)
        #[arg(short = 's', long = "search-path")]
        search_paths: Vec<String>,
    },
    /// Write a default configuration into the project
    Init {
        /// Project path (default: current directory)
        path: Option<String>,
    },
    /// Resolve a single module reference and print its classification
    Explain {
        /// Module reference, e.g. `requests` or `..models`
        module: String,
        /// Project path
        #[arg(short, long)]
        path: Option<String>,
        /// File the reference is imported from, relative to the project
        #[arg(short, long, default_value = "__main__.py")]
        from: String,
        /// Interpreter to query for its module search path
        #[arg(long)]
        python: Option<String>,
        /// Extra module search location (repeatable)
        #[arg(short = 's', long = "search-path")]
        search_paths: Vec<String>,
    },
    /// Show how many imports landed in each bucket
    Stats {
        /// Project path (default: current directory)
        path: Option<String>,
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
        /// Interpreter to query for its module search path
        #[arg(long)]
        python: Option<String>,
        /// Extra module search location (repeatable)
        #[arg(short = 's', long = "search-path")]
        search_paths: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs the stderr log subscriber. A valid `RUST_LOG` always wins;
/// otherwise `--verbose` turns on debug output for this crate.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "importgraph=debug"
    } else {
        "importgraph=warn"
    }
}

fn run(cli: Cli) -> importgraph::errors::Result<()> {
    let base = report_base();
    match cli.command {
        Commands::Check {
            path,
            json,
            python,
            search_paths,
        } => {
            let project_path = resolve_path(path);
            let inspector = open_inspector(&project_path, python, search_paths)?;
            let result = inspector.analyze()?;
            if json {
                println!("{}", format_registry_as_json(&result.registry, &base));
            } else {
                print!("{}", format_report_as_text(&result.registry, &base));
            }
        }
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            ImportInspector::init(&project_path)?;
            println!("Initialized importgraph at {}", project_path.display());
        }
        Commands::Explain {
            module,
            path,
            from,
            python,
            search_paths,
        } => {
            let project_path = resolve_path(path);
            let inspector = open_inspector(&project_path, python, search_paths)?;
            let resolution = inspector.resolve(Path::new(&from), &module)?;
            match &resolution {
                Resolution::Local(origin) | Resolution::ThirdParty(origin) => println!(
                    "{}: {} ({})",
                    module,
                    resolution.kind().as_str(),
                    relative_path(origin, &base).display()
                ),
                _ => println!("{}: {}", module, resolution.kind().as_str()),
            }
        }
        Commands::Stats {
            path,
            json,
            python,
            search_paths,
        } => {
            let project_path = resolve_path(path);
            let inspector = open_inspector(&project_path, python, search_paths)?;
            let result = inspector.analyze()?;
            if json {
                println!("{}", format_stats_as_json(&result.stats));
            } else {
                print!("{}", format_stats(&result.stats));
            }
        }
    }
    Ok(())
}

/// Opens a project with its saved configuration plus command-line overrides.
fn open_inspector(
    project_path: &Path,
    python: Option<String>,
    search_paths: Vec<String>,
) -> importgraph::errors::Result<ImportInspector> {
    let config = load_config(project_path)?.with_overrides(python, search_paths);
    ImportInspector::with_config(project_path, config)
}

/// Resolves an optional path argument to a `PathBuf`.
///
/// Defaults to the current working directory if no path is provided.
fn resolve_path(path: Option<String>) -> PathBuf {
    match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Directory report paths are shown relative to: the canonical working
/// directory, so it lines up with the canonical module identities.
fn report_base() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    std::fs::canonicalize(&cwd).unwrap_or(cwd)
}
