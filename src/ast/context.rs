//! The explicit construction context.
//!
//! One `BuildContext` exists per reduction step. It exposes the shared stack,
//! the matched range and text, the fault policy, and the container currently
//! being assembled. Nested assembly reborrows the context through
//! [`BuildContext::assembling`], so the previous owner comes back into scope
//! as soon as the nested reduction returns.

use tracing::warn;

use super::kind::Class;
use super::node::NodeId;
use super::stack::AstStack;
use crate::config::FaultPolicy;
use crate::errors::AstError;
use crate::syntax::Span;

pub struct BuildContext<'a> {
    stack: &'a mut AstStack,
    input: &'a str,
    span: Span,
    base: usize,
    owner: Option<NodeId>,
    policy: FaultPolicy,
}

impl<'a> BuildContext<'a> {
    /// Context for a match over `span` whose first pushed child, if any, sits
    /// at stack index `base`.
    pub fn new(
        stack: &'a mut AstStack,
        input: &'a str,
        span: Span,
        base: usize,
        policy: FaultPolicy,
    ) -> Self {
        Self {
            stack,
            input,
            span,
            base,
            owner: None,
            policy,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The matched text.
    pub fn text(&self) -> &'a str {
        self.span.slice(self.input)
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn policy(&self) -> FaultPolicy {
        self.policy
    }

    /// The container being assembled, if any.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn stack(&self) -> &AstStack {
        &*self.stack
    }

    pub fn stack_mut(&mut self) -> &mut AstStack {
        &mut *self.stack
    }

    /// Stack height when this match began.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Nodes pushed by this match's children and not yet consumed.
    pub fn matched(&self) -> usize {
        self.stack.len().saturating_sub(self.base)
    }

    /// Reborrows this context with `owner` as the container being assembled.
    pub fn assembling(&mut self, owner: NodeId) -> BuildContext<'_> {
        BuildContext {
            stack: &mut *self.stack,
            input: self.input,
            span: self.span,
            base: self.base,
            owner: Some(owner),
            policy: self.policy,
        }
    }

    /// Applies the fault policy to `error`.
    pub fn fault(&self, error: AstError) -> Result<(), AstError> {
        match self.policy {
            FaultPolicy::Strict => Err(error),
            FaultPolicy::Lenient => {
                warn!(%error, "tolerating construction fault");
                Ok(())
            }
        }
    }

    /// Builds the fault for a mandatory `T` member that found nothing usable.
    pub fn missing<T: Class>(&self) -> AstError {
        match self.stack.top_kind() {
            None => AstError::MissingNode {
                expected: T::kind().name(),
                span: self.span,
            },
            Some(found) => AstError::TypeMismatch {
                expected: T::kind().name(),
                found: found.name(),
                span: self.span,
            },
        }
    }
}
