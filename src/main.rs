//! boxgrid CLI
//!
//! Usage:
//!   boxgrid [OPTIONS] [FILE]
//!
//! Options:
//!   -f, --format <FORMAT>      Output format: text or json
//!   -o, --overlap <POLICY>     Overlap policy: allow, warn or error
//!   -b, --breakpoint <BP>      Breakpoint to audit for overlaps (repeatable)
//!       --strict               Exit with status 1 on error diagnostics
//!   -v, --verbose              Debug logging on stderr
//!   -h, --help                 Print help

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use boxgrid::{solve_document, Breakpoint, LayoutDocument, OverlapPolicy, Solution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "boxgrid")]
#[command(about = "Solve responsive box layouts into CSS grid areas")]
struct Cli {
    /// Layout document, TOML or JSON (reads TOML from stdin if not provided)
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Overlap policy, overriding the document's [solver] table
    #[arg(short, long)]
    overlap: Option<OverlapPolicy>,

    /// Breakpoints to audit for overlaps, overriding the document's [solver] table
    #[arg(short, long = "breakpoint")]
    breakpoints: Vec<Breakpoint>,

    /// Exit with status 1 if any error diagnostic was recorded
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.input.is_none() && io::stdin().is_terminal() {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Error writing help: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let mut document = load(&cli);

    if let Some(policy) = cli.overlap {
        document.solver = document.solver.with_overlap_policy(policy);
    }
    if !cli.breakpoints.is_empty() {
        document.solver = document.solver.with_overlap_breakpoints(cli.breakpoints.clone());
    }

    let solution = solve_document(&document);

    for diagnostic in &solution.diagnostics {
        eprintln!("{}", diagnostic);
    }

    if let Err(e) = print_solution(&solution, cli.format) {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }

    if cli.strict && solution.diagnostics.has_errors() {
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "boxgrid=debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load(cli: &Cli) -> LayoutDocument {
    let (source, filename) = match &cli.input {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            (buffer, "<stdin>".to_string())
        }
    };

    let json = cli
        .input
        .as_deref()
        .is_some_and(boxgrid::document::is_json);
    let loaded = if json {
        LayoutDocument::from_json_str(&source)
    } else {
        LayoutDocument::from_toml_str(&source)
    };

    match loaded {
        Ok(document) => document,
        Err(e) => {
            eprint!("{}", e.format(&source, &filename));
            eprintln!();
            std::process::exit(1);
        }
    }
}

fn print_solution(solution: &Solution, format: Format) -> Result<(), serde_json::Error> {
    match format {
        Format::Text => print!("{}", solution.layout),
        Format::Json => println!("{}", serde_json::to_string_pretty(solution)?),
    }
    Ok(())
}
