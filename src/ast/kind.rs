//! Lightweight node type identity.
//!
//! Every node type and every abstract node family owns exactly one static
//! [`Kind`]. Kinds are compared by address, the same trick as a per-class
//! `static` marker, and each one may name a parent kind. A node "is a" `T`
//! when `T`'s kind appears anywhere on the node's kind chain.
//!
//! [`Class`] is the downcast target trait. Concrete node types implement it
//! through [`impl_node!`](crate::impl_node) with themselves as the target;
//! abstract families declared with [`abstract_class!`](crate::abstract_class)
//! target `dyn Node`, so a slot typed by a family holds any member of it.

use std::fmt;
use std::ptr;

use super::node::Node;

// ============================================================================
// KIND DESCRIPTORS
// ============================================================================

/// Static identity of a node type or node family.
pub struct Kind {
    name: &'static str,
    parent: Option<fn() -> &'static Kind>,
}

impl Kind {
    /// Creates a kind with an optional parent. Intended for `static` items.
    pub const fn new(name: &'static str, parent: Option<fn() -> &'static Kind>) -> Self {
        Self { name, parent }
    }

    /// The type name this kind was declared with.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The parent kind, if this is not a root.
    pub fn parent(&self) -> Option<&'static Kind> {
        self.parent.map(|parent| parent())
    }

    /// Returns true if `other` is this kind or one of its ancestors.
    pub fn is(&self, other: &Kind) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let mut current = self.parent();
        while let Some(kind) = current {
            if ptr::eq(kind, other) {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Iterates this kind followed by each ancestor, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = &Kind> + '_ {
        std::iter::successors(Some(self), |kind| kind.parent())
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for Kind {}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<_> = self.lineage().map(Kind::name).collect();
        write!(f, "Kind({})", chain.join(" < "))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// DOWNCAST TARGETS
// ============================================================================

/// A type usable as a slot parameter and downcast target.
pub trait Class: 'static {
    /// What a slot of this class owns: the node type itself, or `dyn Node`
    /// for abstract families.
    type Target: ?Sized + Node;

    /// The static kind of this class.
    fn kind() -> &'static Kind;

    fn downcast_ref(node: &dyn Node) -> Option<&Self::Target>;

    fn downcast_mut(node: &mut dyn Node) -> Option<&mut Self::Target>;

    /// Converts an owned node, handing it back untouched on mismatch.
    fn downcast(node: Box<dyn Node>) -> Result<Box<Self::Target>, Box<dyn Node>>;

    /// Deep copy with a fresh identity and no parent.
    fn duplicate(target: &Self::Target) -> Box<Self::Target>;

    fn as_node(target: &Self::Target) -> &dyn Node;

    fn into_node(target: Box<Self::Target>) -> Box<dyn Node>;
}

/// Marker for classes that may appear as ancestors of other kinds.
pub trait Abstract: Class<Target = dyn Node> {}

// Shared bodies for the `Class` impls generated by the macros.

#[doc(hidden)]
pub fn parent_kind<C: Abstract>() -> &'static Kind {
    C::kind()
}

#[doc(hidden)]
pub fn family_ref<C: Class>(node: &dyn Node) -> Option<&dyn Node> {
    node.kind().is(C::kind()).then_some(node)
}

#[doc(hidden)]
pub fn family_mut<C: Class>(node: &mut dyn Node) -> Option<&mut dyn Node> {
    if node.kind().is(C::kind()) {
        Some(node)
    } else {
        None
    }
}

#[doc(hidden)]
pub fn family_box<C: Class>(node: Box<dyn Node>) -> Result<Box<dyn Node>, Box<dyn Node>> {
    if node.kind().is(C::kind()) {
        Ok(node)
    } else {
        Err(node)
    }
}

#[doc(hidden)]
pub fn concrete_box<T: Node>(node: Box<dyn Node>) -> Result<Box<T>, Box<dyn Node>> {
    if !node.as_any().is::<T>() {
        return Err(node);
    }
    match node.into_any().downcast::<T>() {
        Ok(concrete) => Ok(concrete),
        Err(_) => unreachable!("type id checked before conversion"),
    }
}

/// Declares an abstract node family usable as an ancestor kind and as a slot
/// parameter holding any member of the family.
///
/// ```rust
/// use pegast::{abstract_class, ast::{AstNode, Class}};
///
/// abstract_class!(pub Expr);
/// abstract_class!(pub Literal: Expr);
///
/// assert!(<Literal as Class>::kind().is(<Expr as Class>::kind()));
/// assert!(<Expr as Class>::kind().is(<AstNode as Class>::kind()));
/// ```
#[macro_export]
macro_rules! abstract_class {
    ($(#[$meta:meta])* $vis:vis $name:ident) => {
        $crate::abstract_class!($(#[$meta])* $vis $name: $crate::ast::AstNode);
    };
    ($(#[$meta:meta])* $vis:vis $name:ident : $parent:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        $vis enum $name {}

        impl $crate::ast::Class for $name {
            type Target = dyn $crate::ast::Node;

            fn kind() -> &'static $crate::ast::Kind {
                static KIND: $crate::ast::Kind = $crate::ast::Kind::new(
                    stringify!($name),
                    Some($crate::ast::kind::parent_kind::<$parent>),
                );
                &KIND
            }

            fn downcast_ref(node: &dyn $crate::ast::Node) -> Option<&dyn $crate::ast::Node> {
                $crate::ast::kind::family_ref::<Self>(node)
            }

            fn downcast_mut(
                node: &mut dyn $crate::ast::Node,
            ) -> Option<&mut dyn $crate::ast::Node> {
                $crate::ast::kind::family_mut::<Self>(node)
            }

            fn downcast(
                node: Box<dyn $crate::ast::Node>,
            ) -> Result<Box<dyn $crate::ast::Node>, Box<dyn $crate::ast::Node>> {
                $crate::ast::kind::family_box::<Self>(node)
            }

            fn duplicate(target: &dyn $crate::ast::Node) -> Box<dyn $crate::ast::Node> {
                target.duplicate()
            }

            fn as_node(target: &dyn $crate::ast::Node) -> &dyn $crate::ast::Node {
                target
            }

            fn into_node(target: Box<dyn $crate::ast::Node>) -> Box<dyn $crate::ast::Node> {
                target
            }
        }

        impl $crate::ast::Abstract for $name {}
    };
}

// ============================================================================
// ROOT CLASSES
// ============================================================================

/// Root family: every node kind descends from it.
#[derive(Debug, Clone, Copy)]
pub enum AstNode {}

impl Class for AstNode {
    type Target = dyn Node;

    fn kind() -> &'static Kind {
        static KIND: Kind = Kind::new("AstNode", None);
        &KIND
    }

    fn downcast_ref(node: &dyn Node) -> Option<&dyn Node> {
        Some(node)
    }

    fn downcast_mut(node: &mut dyn Node) -> Option<&mut dyn Node> {
        Some(node)
    }

    fn downcast(node: Box<dyn Node>) -> Result<Box<dyn Node>, Box<dyn Node>> {
        Ok(node)
    }

    fn duplicate(target: &dyn Node) -> Box<dyn Node> {
        target.duplicate()
    }

    fn as_node(target: &dyn Node) -> &dyn Node {
        target
    }

    fn into_node(target: Box<dyn Node>) -> Box<dyn Node> {
        target
    }
}

impl Abstract for AstNode {}

abstract_class!(
    /// Default ancestor of container node kinds.
    pub AstContainer
);
