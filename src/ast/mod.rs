//! Typed tree construction.
//!
//! Node types declare their member slots; when the grammar reports a rule
//! match, the bound factory creates the node and lets its slots claim
//! already-built children from the shared [`AstStack`], then pushes the
//! finished node for its own parent to claim.

// ============================================================================
// MODULES
// ============================================================================

pub mod container;
pub mod context;
pub mod kind;
pub mod list;
pub mod node;
pub mod ptr;
pub mod stack;
pub mod tree;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use container::{Container, Member};
pub use context::BuildContext;
pub use kind::{Abstract, AstContainer, AstNode, Class, Kind};
pub use list::List;
pub use node::{Create, Node, NodeHeader, NodeId};
pub use ptr::{Opt, Ptr};
pub use stack::AstStack;
pub use tree::{find, parent_of, TreeDump};
