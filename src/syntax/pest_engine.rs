//! Matching engine adapter over [`pest`].
//!
//! pest performs the matching and backtracking; this adapter replays the
//! resulting match tree depth-first, so every pair is reported after all of
//! its inner pairs.

use std::fmt;
use std::marker::PhantomData;

use pest::iterators::Pair;
use pest::RuleType;
use tracing::debug;

use super::{ErrorList, MatchEngine, MatchSink, Span, SyntaxError};
use crate::errors::AstError;

/// Engine backed by a `pest_derive` parser `P` over rules `R`.
pub struct PestEngine<P, R> {
    _parser: PhantomData<fn() -> (P, R)>,
}

impl<P, R> PestEngine<P, R> {
    pub fn new() -> Self {
        Self {
            _parser: PhantomData,
        }
    }
}

impl<P, R> Default for PestEngine<P, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> Clone for PestEngine<P, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, R> Copy for PestEngine<P, R> {}

impl<P, R> fmt::Debug for PestEngine<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PestEngine<{}>", std::any::type_name::<P>())
    }
}

impl<P, R> MatchEngine for PestEngine<P, R>
where
    P: pest::Parser<R>,
    R: RuleType,
{
    type Rule = R;

    fn run(
        &self,
        input: &str,
        root: R,
        whitespace: Option<R>,
        errors: &mut ErrorList,
        sink: &mut dyn MatchSink<R>,
    ) -> Result<bool, AstError> {
        let pairs = match P::parse(root, input) {
            Ok(pairs) => pairs,
            Err(error) => {
                let error = SyntaxError::from_pest(&error);
                debug!(rule = ?root, line = error.line, column = error.column, "grammar mismatch");
                errors.push(error);
                return Ok(false);
            }
        };
        for pair in pairs {
            report(pair, whitespace, sink)?;
        }
        Ok(true)
    }
}

fn report<R: RuleType>(
    pair: Pair<'_, R>,
    whitespace: Option<R>,
    sink: &mut dyn MatchSink<R>,
) -> Result<(), AstError> {
    let rule = pair.as_rule();
    if Some(rule) == whitespace {
        return Ok(());
    }
    let span = Span::from(pair.as_span());
    sink.begin(rule);
    for inner in pair.into_inner() {
        report(inner, whitespace, sink)?;
    }
    sink.success(rule, span)
}
