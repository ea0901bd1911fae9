//! Construction faults.
//!
//! Grammar mismatches are not errors at this layer: the engine records them
//! in an [`ErrorList`](crate::syntax::ErrorList) and the driver yields no
//! root. Everything here signals a disagreement between the grammar's match
//! structure and the declared node shapes, or a broken engine contract.

use miette::Diagnostic;
use thiserror::Error;

use crate::syntax::Span;

/// Classification of an [`AstError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The stack did not have the shape the nodes expected.
    ConstructionShape,
    /// A mandatory member found a node of the wrong kind.
    TypeMismatch,
    /// A leaf could not interpret the text it matched.
    InvalidLeaf,
    /// The engine broke the well-nested event contract.
    Protocol,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::ConstructionShape => "ConstructionShape",
            ErrorCategory::TypeMismatch => "TypeMismatch",
            ErrorCategory::InvalidLeaf => "InvalidLeaf",
            ErrorCategory::Protocol => "Protocol",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fault raised while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AstError {
    #[error("expected a `{expected}` node but the AST stack is empty")]
    #[diagnostic(
        code(pegast::missing_node),
        help("the rule's grammar produced fewer nodes than its node type declares")
    )]
    MissingNode {
        expected: &'static str,
        #[label("while building this match")]
        span: Span,
    },

    #[error("expected a `{expected}` node, found `{found}`")]
    #[diagnostic(
        code(pegast::type_mismatch),
        help("check the member order of the node bound to this rule")
    )]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        #[label("while building this match")]
        span: Span,
    },

    #[error("parse finished with {depth} nodes on the AST stack, expected exactly one")]
    #[diagnostic(
        code(pegast::stack_depth),
        help("bind the root rule, or make sure every produced node is consumed by a parent")
    )]
    StackDepth { depth: usize },

    #[error("root node is a `{found}`, expected `{expected}`")]
    #[diagnostic(code(pegast::root_mismatch))]
    RootMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot read `{text}` as {kind}: {reason}")]
    #[diagnostic(code(pegast::invalid_leaf))]
    InvalidLeaf {
        kind: &'static str,
        text: String,
        reason: String,
        #[label("matched here")]
        span: Span,
    },

    #[error("match engine protocol violation: {message}")]
    #[diagnostic(code(pegast::protocol))]
    Protocol { message: String },
}

impl AstError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AstError::MissingNode { .. } | AstError::StackDepth { .. } => {
                ErrorCategory::ConstructionShape
            }
            AstError::TypeMismatch { .. } | AstError::RootMismatch { .. } => {
                ErrorCategory::TypeMismatch
            }
            AstError::InvalidLeaf { .. } => ErrorCategory::InvalidLeaf,
            AstError::Protocol { .. } => ErrorCategory::Protocol,
        }
    }

    /// The input range the fault relates to, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            AstError::MissingNode { span, .. }
            | AstError::TypeMismatch { span, .. }
            | AstError::InvalidLeaf { span, .. } => Some(*span),
            AstError::StackDepth { .. }
            | AstError::RootMismatch { .. }
            | AstError::Protocol { .. } => None,
        }
    }

    pub fn invalid_leaf(
        kind: &'static str,
        text: impl Into<String>,
        reason: impl ToString,
        span: Span,
    ) -> Self {
        AstError::InvalidLeaf {
            kind,
            text: text.into(),
            reason: reason.to_string(),
            span,
        }
    }
}
