//! Handles all user-facing output for the CLI.
//!
//! Trees go to stdout in the requested format; diagnostics go to stderr as
//! miette reports. Color is only used when stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use miette::{Diagnostic, NamedSource, Report};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::TreeDump;
use crate::cli::args::Format;

// ============================================================================
// TREES
// ============================================================================

/// Prints `dump` to stdout.
pub fn print_tree(dump: &TreeDump, format: Format) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    match format {
        Format::Sexpr => writeln!(stdout, "{}", dump.sexpr()),
        Format::Json => {
            let json = serde_json::to_string_pretty(dump)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            writeln!(stdout, "{json}")
        }
        Format::Outline => write_outline(&mut stdout, dump, 0),
    }
}

fn write_outline(out: &mut impl WriteColor, dump: &TreeDump, depth: usize) -> io::Result<()> {
    write!(out, "{:indent$}", "", indent = depth * 2)?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(out, "{}", dump.kind)?;
    out.reset()?;
    if let Some(label) = &dump.label {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, " {label:?}")?;
        out.reset()?;
    }
    writeln!(out, " @{}..{}", dump.span.start, dump.span.end)?;
    for child in &dump.children {
        write_outline(out, child, depth + 1)?;
    }
    Ok(())
}

// ============================================================================
// STATUS AND DIAGNOSTICS
// ============================================================================

/// Prints a one-line success message.
pub fn print_ok(message: &str) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice());
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(stdout, "ok")?;
    stdout.reset()?;
    writeln!(stdout, ": {message}")
}

/// Renders `diagnostic` against the source it refers to on stderr.
pub fn print_diagnostic<D>(diagnostic: D, name: &str, source: &str)
where
    D: Diagnostic + Send + Sync + 'static,
{
    let report = Report::new(diagnostic)
        .with_source_code(NamedSource::new(name, source.to_string()));
    eprintln!("{report:?}");
}

fn color_choice() -> ColorChoice {
    if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Span;
    use termcolor::NoColor;

    #[test]
    fn outline_matches_the_plain_rendering() {
        let dump = TreeDump {
            kind: "Decl",
            span: Span::new(0, 6),
            label: None,
            children: vec![TreeDump {
                kind: "Name",
                span: Span::new(4, 5),
                label: Some("x".into()),
                children: Vec::new(),
            }],
        };
        let mut out = NoColor::new(Vec::new());
        write_outline(&mut out, &dump, 0).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, dump.outline());
    }
}
