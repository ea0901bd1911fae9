//! The node trait and the per-node header.
//!
//! A node carries a [`NodeHeader`]: its identity, the span it matched, and
//! the identity of the container that owns it. Ownership runs strictly
//! downwards through boxed slots, so the parent link is an id rather than a
//! pointer; [`tree::parent_of`](super::tree::parent_of) resolves it inside a
//! tree.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::context::BuildContext;
use super::kind::{Class, Kind};
use crate::errors::AstError;
use crate::syntax::Span;

// ============================================================================
// IDENTITY
// ============================================================================

/// Process-unique node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh id.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State every node carries.
///
/// Cloning a header yields a fresh identity and no parent: a copy is a new
/// node until some slot accepts it.
#[derive(Debug)]
pub struct NodeHeader {
    id: NodeId,
    parent: Option<NodeId>,
    span: Span,
}

impl NodeHeader {
    /// A header with a fresh id, no parent and an empty span.
    pub fn new() -> Self {
        Self {
            id: NodeId::fresh(),
            parent: None,
            span: Span::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Id of the owning container; `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Byte range of the input this node was built from.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Overrides the matched range. Factories call it before reduction.
    pub fn set_span(&mut self, span: Span) {
        self.span = span;
    }

    pub(crate) fn adopt(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

impl Default for NodeHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NodeHeader {
    fn clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            parent: None,
            span: self.span,
        }
    }
}

// ============================================================================
// NODE TRAIT
// ============================================================================

/// An element of the tree.
///
/// Implement it with [`impl_node!`](crate::impl_node) rather than by hand;
/// the macro keeps the kind, downcast and duplication plumbing consistent.
pub trait Node: Any + fmt::Debug {
    fn header(&self) -> &NodeHeader;

    fn header_mut(&mut self) -> &mut NodeHeader;

    /// The concrete kind of this node.
    fn kind(&self) -> &'static Kind;

    /// Registers member slots with this node. Containers override it; it runs
    /// on creation and again on every copy.
    fn register(&mut self) {}

    /// Fills the node from the shared stack. A no-op for plain leaves.
    fn construct(&mut self, _cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        Ok(())
    }

    /// Deep copy with a fresh identity and no parent.
    fn duplicate(&self) -> Box<dyn Node>;

    /// Owned children in declaration and match order.
    fn children(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    /// Short description of leaf data, used by tree dumps.
    fn label(&self) -> Option<String> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// This node's identity; copies never share it.
    fn id(&self) -> NodeId {
        self.header().id()
    }

    /// The container owning this node, if any.
    fn parent(&self) -> Option<NodeId> {
        self.header().parent()
    }

    /// The input range this node matched.
    fn span(&self) -> Span {
        self.header().span()
    }
}

impl dyn Node {
    /// True if this node's kind is `T`'s kind or descends from it.
    pub fn isa<T: Class>(&self) -> bool {
        self.kind().is(T::kind())
    }

    /// Views this node as a `T`, or `None` if it is not one.
    pub fn get_as<T: Class>(&self) -> Option<&T::Target> {
        T::downcast_ref(self)
    }

    pub fn get_as_mut<T: Class>(&mut self) -> Option<&mut T::Target> {
        T::downcast_mut(self)
    }

    /// Converts an owned node, returning it unchanged on mismatch.
    pub fn downcast<T: Class>(self: Box<Self>) -> Result<Box<T::Target>, Box<dyn Node>> {
        T::downcast(self)
    }
}

/// Creation of a node with its slots registered.
pub trait Create: Node + Sized {
    fn create() -> Self;
}

impl<T: Node + Default> Create for T {
    fn create() -> Self {
        let mut node = T::default();
        node.register();
        node
    }
}

// ============================================================================
// DECLARATION MACRO
// ============================================================================

/// Implements [`Node`] and [`Class`] for a struct holding a `header:
/// NodeHeader` field.
///
/// Leaves name an optional construct hook and label function and derive
/// `Clone` themselves. Containers list their member slot fields in
/// declaration order; they hold only the header and those slots, and the
/// macro supplies a `Clone` that re-registers the copied slots, so they must
/// not derive it.
///
/// ```rust
/// use pegast::ast::{BuildContext, Create, NodeHeader, Ptr};
/// use pegast::{abstract_class, impl_node, AstError};
///
/// abstract_class!(pub Expr);
///
/// #[derive(Debug, Clone, Default)]
/// pub struct Ident {
///     header: NodeHeader,
///     name: String,
/// }
///
/// impl Ident {
///     fn read(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
///         self.name = cx.text().to_string();
///         Ok(())
///     }
/// }
///
/// impl_node!(Ident: Expr, construct = Ident::read, label = |n: &Ident| n.name.clone());
///
/// #[derive(Debug, Default)]
/// pub struct Neg {
///     header: NodeHeader,
///     operand: Ptr<Expr>,
/// }
///
/// impl_node!(Neg: Expr { operand });
///
/// let neg = Neg::create();
/// assert!(neg.operand.get().is_none());
/// ```
#[macro_export]
macro_rules! impl_node {
    (@common $ty:ident) => {
        fn header(&self) -> &$crate::ast::NodeHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut $crate::ast::NodeHeader {
            &mut self.header
        }

        fn kind(&self) -> &'static $crate::ast::Kind {
            <$ty as $crate::ast::Class>::kind()
        }

        fn duplicate(&self) -> Box<dyn $crate::ast::Node> {
            <$ty as $crate::ast::Class>::duplicate(self)
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
            self
        }
    };

    (@class $ty:ident, $parent:ty) => {
        impl $crate::ast::Class for $ty {
            type Target = $ty;

            fn kind() -> &'static $crate::ast::Kind {
                static KIND: $crate::ast::Kind = $crate::ast::Kind::new(
                    stringify!($ty),
                    Some($crate::ast::kind::parent_kind::<$parent>),
                );
                &KIND
            }

            fn downcast_ref(node: &dyn $crate::ast::Node) -> Option<&$ty> {
                node.as_any().downcast_ref::<$ty>()
            }

            fn downcast_mut(node: &mut dyn $crate::ast::Node) -> Option<&mut $ty> {
                node.as_any_mut().downcast_mut::<$ty>()
            }

            fn downcast(
                node: Box<dyn $crate::ast::Node>,
            ) -> Result<Box<$ty>, Box<dyn $crate::ast::Node>> {
                $crate::ast::kind::concrete_box::<$ty>(node)
            }

            fn duplicate(target: &$ty) -> Box<$ty> {
                let mut copy = Box::new(::std::clone::Clone::clone(target));
                $crate::ast::Node::register(copy.as_mut());
                copy
            }

            fn as_node(target: &$ty) -> &dyn $crate::ast::Node {
                target
            }

            fn into_node(target: Box<$ty>) -> Box<dyn $crate::ast::Node> {
                target
            }
        }
    };

    // Containers.
    ($ty:ident $(: $parent:ty)? { $($member:ident),* $(,)? } $(, label = $label:expr)? $(,)?) => {
        $crate::impl_node!(@class $ty, $crate::__first_ty!($($parent,)? $crate::ast::AstContainer));

        impl $crate::ast::Node for $ty {
            $crate::impl_node!(@common $ty);

            fn register(&mut self) {
                $crate::ast::container::register_members(self);
            }

            fn construct(
                &mut self,
                cx: &mut $crate::ast::BuildContext<'_>,
            ) -> Result<(), $crate::AstError> {
                $crate::ast::container::reduce(self, cx)
            }

            fn children(&self) -> Vec<&dyn $crate::ast::Node> {
                $crate::ast::container::member_children(self)
            }

            $(
                fn label(&self) -> Option<String> {
                    let label = $label;
                    Some(label(self))
                }
            )?
        }

        impl ::std::clone::Clone for $ty {
            fn clone(&self) -> Self {
                let mut copy = Self {
                    header: ::std::clone::Clone::clone(&self.header),
                    $($member: ::std::clone::Clone::clone(&self.$member),)*
                };
                $crate::ast::Node::register(&mut copy);
                copy
            }
        }

        impl $crate::ast::Container for $ty {
            fn members(&self) -> Vec<&dyn $crate::ast::Member> {
                vec![$(&self.$member as &dyn $crate::ast::Member),*]
            }

            fn members_mut(&mut self) -> Vec<&mut dyn $crate::ast::Member> {
                vec![$(&mut self.$member as &mut dyn $crate::ast::Member),*]
            }
        }
    };

    // Leaves.
    ($ty:ident $(: $parent:ty)? $(, construct = $construct:expr)? $(, label = $label:expr)? $(,)?) => {
        $crate::impl_node!(@class $ty, $crate::__first_ty!($($parent,)? $crate::ast::AstNode));

        impl $crate::ast::Node for $ty {
            $crate::impl_node!(@common $ty);

            $(
                fn construct(
                    &mut self,
                    cx: &mut $crate::ast::BuildContext<'_>,
                ) -> Result<(), $crate::AstError> {
                    let construct = $construct;
                    construct(self, cx)
                }
            )?

            $(
                fn label(&self) -> Option<String> {
                    let label = $label;
                    Some(label(self))
                }
            )?
        }
    };

}

#[doc(hidden)]
#[macro_export]
macro_rules! __first_ty {
    ($first:ty $(, $rest:ty)*) => {
        $first
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_class;
    use crate::ast::AstNode;

    abstract_class!(Shape);

    #[derive(Debug, Clone, Default)]
    struct Circle {
        header: NodeHeader,
        radius: u32,
    }

    impl_node!(Circle: Shape, label = |c: &Circle| c.radius.to_string());

    #[derive(Debug, Clone, Default)]
    struct Square {
        header: NodeHeader,
    }

    impl_node!(Square: Shape);

    #[derive(Debug, Clone, Default)]
    struct Marker {
        header: NodeHeader,
    }

    impl_node!(Marker);

    #[test]
    fn isa_follows_the_kind_chain() {
        let circle: Box<dyn Node> = Box::new(Circle::create());
        assert!(circle.isa::<Circle>());
        assert!(circle.isa::<Shape>());
        assert!(circle.isa::<AstNode>());
        assert!(!circle.isa::<Square>());
        assert!(!circle.isa::<Marker>());

        let marker: Box<dyn Node> = Box::new(Marker::create());
        assert!(marker.isa::<AstNode>());
        assert!(!marker.isa::<Shape>());
    }

    #[test]
    fn get_as_returns_the_concrete_node() {
        let mut node: Box<dyn Node> = Box::new(Circle {
            radius: 3,
            ..Circle::default()
        });
        assert_eq!(node.get_as::<Circle>().map(|c| c.radius), Some(3));
        assert!(node.get_as::<Square>().is_none());
        assert!(node.get_as::<Shape>().is_some());

        if let Some(circle) = node.get_as_mut::<Circle>() {
            circle.radius = 5;
        }
        assert_eq!(node.label().as_deref(), Some("5"));
    }

    #[test]
    fn downcast_hands_back_mismatches() {
        let node: Box<dyn Node> = Box::new(Square::create());
        let id = node.id();
        let node = node.downcast::<Circle>().expect_err("a square is not a circle");
        assert_eq!(node.id(), id);
        let square = node.downcast::<Square>().expect("square");
        assert_eq!(square.id(), id);
    }

    #[test]
    fn copies_get_fresh_identity_without_parent() {
        let mut header = NodeHeader::new();
        header.set_span(Span::new(2, 4));
        header.adopt(Some(NodeId::fresh()));
        let copy = header.clone();
        assert_ne!(copy.id(), header.id());
        assert_eq!(copy.parent(), None);
        assert_eq!(copy.span(), Span::new(2, 4));
    }

    #[test]
    fn duplicate_preserves_leaf_data() {
        let circle = Circle {
            radius: 9,
            ..Circle::default()
        };
        let copy = circle.duplicate();
        assert_eq!(copy.get_as::<Circle>().map(|c| c.radius), Some(9));
        assert_ne!(copy.id(), circle.id());
    }
}
