//! The top-level parse driver.
//!
//! The driver owns one [`AstStack`] per parse. It listens to the engine's
//! match events, remembers the stack height at each `begin`, and on each
//! `success` runs the factory bound to the rule. When the engine accepts the
//! input, exactly one node must remain: the root.

use tracing::{debug, warn};

use crate::ast::{AstStack, BuildContext, Class, Node};
use crate::config::{FaultPolicy, ParseConfig};
use crate::errors::AstError;
use crate::registry::ParseDelegate;
use crate::syntax::{ErrorList, MatchEngine, MatchSink, PestEngine, Span};

// ============================================================================
// ENGINE-GENERIC DRIVER
// ============================================================================

/// A configured parser: engine, rule bindings, skip rule and fault policy.
#[derive(Debug, Clone)]
pub struct AstParser<E: MatchEngine, D> {
    engine: E,
    delegate: D,
    whitespace: Option<E::Rule>,
    config: ParseConfig,
}

impl<E, D> AstParser<E, D>
where
    E: MatchEngine,
    D: ParseDelegate<E::Rule>,
{
    pub fn new(engine: E, delegate: D) -> Self {
        Self {
            engine,
            delegate,
            whitespace: None,
            config: ParseConfig::default(),
        }
    }

    /// Matches of `rule`, and everything beneath them, build no nodes.
    pub fn with_whitespace(mut self, rule: E::Rule) -> Self {
        self.whitespace = Some(rule);
        self
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Parses `input` starting at `root`.
    ///
    /// Returns `Ok(None)` when the grammar rejects the input; the engine's
    /// diagnostics are appended to `errors`.
    pub fn parse(
        &self,
        input: &str,
        root: E::Rule,
        errors: &mut ErrorList,
    ) -> Result<Option<Box<dyn Node>>, AstError> {
        let policy = self.config.fault_policy;
        let mut session = Session {
            stack: AstStack::new(),
            input,
            delegate: &self.delegate,
            policy,
            open: Vec::new(),
        };
        if !self
            .engine
            .run(input, root, self.whitespace, errors, &mut session)?
        {
            debug!(rule = ?root, errors = errors.len(), "input rejected by grammar");
            return Ok(None);
        }
        if let Some((rule, _)) = session.open.last() {
            return Err(AstError::Protocol {
                message: format!("match of {rule:?} began but never completed"),
            });
        }
        finish(session.stack, policy)
    }

    /// Parses `input` and downcasts the root to `T`.
    pub fn parse_as<T: Class>(
        &self,
        input: &str,
        root: E::Rule,
        errors: &mut ErrorList,
    ) -> Result<Option<Box<T::Target>>, AstError> {
        match self.parse(input, root, errors)? {
            Some(node) => downcast_root::<T>(node).map(Some),
            None => Ok(None),
        }
    }
}

fn finish(mut stack: AstStack, policy: FaultPolicy) -> Result<Option<Box<dyn Node>>, AstError> {
    let depth = stack.len();
    match (depth, policy) {
        (1, _) => {
            let root = stack.pop();
            if let Some(root) = &root {
                debug!(root = root.kind().name(), "parse complete");
            }
            Ok(root)
        }
        (_, FaultPolicy::Strict) => Err(AstError::StackDepth { depth }),
        (0, FaultPolicy::Lenient) => {
            warn!("parse produced no node");
            Ok(None)
        }
        (_, FaultPolicy::Lenient) => {
            warn!(depth, "parse left extra nodes; keeping the top one");
            Ok(stack.pop())
        }
    }
}

fn downcast_root<T: Class>(node: Box<dyn Node>) -> Result<Box<T::Target>, AstError> {
    T::downcast(node).map_err(|node| AstError::RootMismatch {
        expected: T::kind().name(),
        found: node.kind().name(),
    })
}

// ============================================================================
// MATCH SESSION
// ============================================================================

struct Session<'a, R, D: ?Sized> {
    stack: AstStack,
    input: &'a str,
    delegate: &'a D,
    policy: FaultPolicy,
    open: Vec<(R, usize)>,
}

impl<'a, R, D> MatchSink<R> for Session<'a, R, D>
where
    R: Copy + Eq + std::fmt::Debug,
    D: ParseDelegate<R> + ?Sized,
{
    fn begin(&mut self, rule: R) {
        self.open.push((rule, self.stack.len()));
    }

    fn success(&mut self, rule: R, span: Span) -> Result<(), AstError> {
        let base = match self.open.pop() {
            Some((open, base)) if open == rule => base,
            Some((open, _)) => {
                return Err(AstError::Protocol {
                    message: format!("{rule:?} completed while {open:?} was open"),
                })
            }
            None => {
                return Err(AstError::Protocol {
                    message: format!("{rule:?} completed without beginning"),
                })
            }
        };
        let Some(factory) = self.delegate.factory(rule) else {
            return Ok(());
        };
        let mut cx = BuildContext::new(&mut self.stack, self.input, span, base, self.policy);
        factory(&mut cx)?;
        if self.stack.len() != base + 1 {
            debug!(
                rule = ?rule,
                base,
                height = self.stack.len(),
                "bound match did not leave exactly one node"
            );
        }
        Ok(())
    }
}

// ============================================================================
// PEST FRONT END
// ============================================================================

/// Parses `input` with pest parser `P`, building nodes through `delegate`.
///
/// Faults are strict; use [`AstParser`] with a [`ParseConfig`] to tolerate
/// them.
pub fn parse<P, R, D>(
    input: &str,
    root: R,
    whitespace: Option<R>,
    errors: &mut ErrorList,
    delegate: &D,
) -> Result<Option<Box<dyn Node>>, AstError>
where
    P: pest::Parser<R>,
    R: pest::RuleType,
    D: ParseDelegate<R> + ?Sized,
{
    let mut parser = AstParser::new(PestEngine::<P, R>::new(), delegate);
    parser.whitespace = whitespace;
    parser.parse(input, root, errors)
}

/// [`parse`], downcasting the root to `T`.
pub fn parse_as<T, P, R, D>(
    input: &str,
    root: R,
    whitespace: Option<R>,
    errors: &mut ErrorList,
    delegate: &D,
) -> Result<Option<Box<T::Target>>, AstError>
where
    T: Class,
    P: pest::Parser<R>,
    R: pest::RuleType,
    D: ParseDelegate<R> + ?Sized,
{
    match parse::<P, R, D>(input, root, whitespace, errors, delegate)? {
        Some(node) => downcast_root::<T>(node).map(Some),
        None => Ok(None),
    }
}
