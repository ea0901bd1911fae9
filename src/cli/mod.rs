//! The pegast command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::path::Path;
use std::{fs, process};

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::ast::{Node, TreeDump};
use crate::calc::{self, Rule};
use crate::cli::args::{Command, Format, InputArgs, ParseArgs, PegastArgs};
use crate::config::{FaultPolicy, ParseConfig};
use crate::syntax::ErrorList;

pub mod args;
pub mod output;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// The main entry point for the CLI.
pub fn run() {
    init_logging();
    let args = PegastArgs::parse();

    let result = match args.command {
        Command::Ast {
            input,
            format,
            options,
        } => handle_ast(&input, format, &options),
        Command::Check { input, options } => handle_check(&input, &options),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Handles the `ast` subcommand.
fn handle_ast(input: &InputArgs, format: Format, options: &ParseArgs) -> CliResult<bool> {
    let source = Source::load(input)?;
    let config = load_config(options)?;
    let Some(root) = build(&source, config) else {
        return Ok(false);
    };
    output::print_tree(&TreeDump::of(root.as_ref()), format)?;
    Ok(true)
}

/// Handles the `check` subcommand.
fn handle_check(input: &InputArgs, options: &ParseArgs) -> CliResult<bool> {
    let source = Source::load(input)?;
    let config = load_config(options)?;
    let Some(root) = build(&source, config) else {
        return Ok(false);
    };
    let dump = TreeDump::of(root.as_ref());
    output::print_ok(&format!("{} ({} nodes)", source.name, dump.size()))?;
    Ok(true)
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

struct Source {
    name: String,
    text: String,
    expression: bool,
}

impl Source {
    fn load(input: &InputArgs) -> CliResult<Self> {
        if let Some(expr) = &input.expr {
            return Ok(Self {
                name: "<expr>".to_string(),
                text: expr.clone(),
                expression: true,
            });
        }
        let path = input.file.as_deref().ok_or("no input given")?;
        Ok(Self {
            name: path.display().to_string(),
            text: read(path)?,
            expression: false,
        })
    }
}

fn read(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e).into())
}

fn load_config(options: &ParseArgs) -> CliResult<ParseConfig> {
    let mut config = match &options.config {
        Some(path) => ParseConfig::from_json(&read(path)?)
            .map_err(|e| format!("invalid config {}: {}", path.display(), e))?,
        None => ParseConfig::default(),
    };
    if options.lenient {
        config.fault_policy = FaultPolicy::Lenient;
    }
    debug!(?config, "parse configuration");
    Ok(config)
}

/// Parses `source`, reporting every diagnostic. `None` means nothing usable
/// was built.
fn build(source: &Source, config: ParseConfig) -> Option<Box<dyn Node>> {
    let mut errors = ErrorList::new();
    let built = if source.expression {
        calc::parse_expr(&source.text, config, &mut errors)
    } else {
        calc::parser(config).parse(&source.text, Rule::program, &mut errors)
    };
    match built {
        Ok(Some(root)) => Some(root),
        Ok(None) => {
            if errors.is_empty() {
                warn!(source = %source.name, "no tree was built");
            }
            for error in errors {
                output::print_diagnostic(error, &source.name, &source.text);
            }
            None
        }
        Err(error) => {
            output::print_diagnostic(error, &source.name, &source.text);
            None
        }
    }
}
