//! Typed, owned syntax trees for PEG parsers.
//!
//! A matching engine reports rule matches bottom-up; each bound rule builds
//! one node whose member slots claim already-built children from a shared
//! stack. See [`ast`] for node declaration, [`registry`] for rule bindings
//! and [`driver`] for running a parse.

pub use crate::config::{FaultPolicy, ParseConfig};
pub use crate::errors::{AstError, ErrorCategory};

pub mod ast;
pub mod calc;
pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod registry;
pub mod syntax;

pub use crate::driver::{parse, parse_as, AstParser};
pub use crate::registry::{Factory, ParseDelegate, RuleBindings};
