//! Syntax diagnostics recorded by the matching engine.

use miette::{Diagnostic, LabeledSpan};
use serde::Serialize;
use thiserror::Error;

use super::Span;

/// One recoverable syntax diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    /// 1-based line and column of the error position.
    pub line: usize,
    pub column: usize,
    /// Rules the engine would have accepted at this position.
    pub expected: Vec<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            span,
            line,
            column,
            expected: Vec::new(),
        }
    }

    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    fn expected_label(&self) -> String {
        if self.expected.is_empty() {
            "here".to_string()
        } else {
            format!("expected {}", self.expected.join(", "))
        }
    }

    /// Converts a pest failure into a diagnostic.
    pub fn from_pest<R: pest::RuleType>(error: &pest::error::Error<R>) -> Self {
        let span = match error.location {
            pest::error::InputLocation::Pos(pos) => Span::new(pos, pos),
            pest::error::InputLocation::Span((start, end)) => Span::new(start, end),
        };
        let (line, column) = match error.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        let expected = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } => {
                positives.iter().map(|rule| format!("{rule:?}")).collect()
            }
            pest::error::ErrorVariant::CustomError { .. } => Vec::new(),
        };
        SyntaxError::new(error.variant.message(), span, line, column).with_expected(expected)
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("pegast::syntax"))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new(Some(self.expected_label()), self.span.start, self.span.len());
        Some(Box::new(std::iter::once(label)))
    }
}

/// Ordered collection of syntax diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<SyntaxError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SyntaxError) {
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxError> {
        self.errors.iter()
    }

    pub fn first(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl IntoIterator for ErrorList {
    type Item = SyntaxError;
    type IntoIter = std::vec::IntoIter<SyntaxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a SyntaxError;
    type IntoIter = std::slice::Iter<'a, SyntaxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
