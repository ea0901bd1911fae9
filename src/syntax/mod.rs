//! The boundary to the matching engine.
//!
//! Tree construction never matches input itself. An engine implementing
//! [`MatchEngine`] reports every successful rule match to a [`MatchSink`]:
//! `begin` when a match starts being reported, `success` once it is
//! complete, children strictly before parents. Diagnostics for failed
//! matches go into an [`ErrorList`].

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::errors::AstError;

pub mod error;
pub mod pest_engine;

pub use error::{ErrorList, SyntaxError};
pub use pest_engine::PestEngine;

// ============================================================================
// SPANS
// ============================================================================

/// A matched input range `[start, end)` in byte offsets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched slice of `input`, or `""` if the span is out of bounds.
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(span: pest::Span<'_>) -> Self {
        Span::new(span.start(), span.end())
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

// ============================================================================
// ENGINE CONTRACT
// ============================================================================

/// Receiver of match events.
pub trait MatchSink<R> {
    /// A match of `rule` is about to be reported; its children follow.
    fn begin(&mut self, rule: R);

    /// The match opened by the latest unmatched `begin` succeeded over `span`.
    fn success(&mut self, rule: R, span: Span) -> Result<(), AstError>;
}

/// A PEG matching engine.
pub trait MatchEngine {
    /// Grammar rule identity.
    type Rule: Copy + Eq + Hash + Debug;

    /// Matches `input` against `root`, reporting successes to `sink`.
    ///
    /// Returns `Ok(false)` on grammar mismatch after recording diagnostics in
    /// `errors`. Matches of `whitespace` and everything beneath them are not
    /// reported. Errors raised by the sink abort the run and are returned.
    fn run(
        &self,
        input: &str,
        root: Self::Rule,
        whitespace: Option<Self::Rule>,
        errors: &mut ErrorList,
        sink: &mut dyn MatchSink<Self::Rule>,
    ) -> Result<bool, AstError>;
}
