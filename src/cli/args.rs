//! Defines the command-line arguments and subcommands for the pegast CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "pegast",
    version,
    about = "Builds typed syntax trees for the calc demo language."
)]
pub struct PegastArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a program or expression and print its tree.
    Ast {
        #[command(flatten)]
        input: InputArgs,
        /// How to print the tree.
        #[arg(long, short, value_enum, default_value_t = Format::Sexpr)]
        format: Format,
        #[command(flatten)]
        options: ParseArgs,
    },
    /// Parse a program or expression and report only diagnostics.
    Check {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        options: ParseArgs,
    },
}

/// Where the source text comes from.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// The path to a calc program.
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    pub file: Option<PathBuf>,
    /// Parse this expression instead of a program file.
    #[arg(long, short)]
    pub expr: Option<String>,
}

/// Construction options.
#[derive(Debug, Args)]
pub struct ParseArgs {
    /// JSON file holding a parse configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Tolerate construction faults instead of failing.
    #[arg(long)]
    pub lenient: bool,
}

/// Tree output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `(Kind child ...)` on one line.
    Sexpr,
    /// One node per line, indented by depth.
    Outline,
    /// Pretty-printed JSON.
    Json,
}
