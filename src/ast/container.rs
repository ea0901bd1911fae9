//! Containers and the member reduction protocol.
//!
//! A container's member slots register with it in declaration order. When
//! the container's rule has matched, its children sit on the shared stack in
//! match order with the last matched child on top, so reduction walks the
//! members in reverse: the last declared member claims the top of the stack,
//! and so on down to the first.

use std::fmt;

use tracing::trace;

use super::context::BuildContext;
use super::node::{Node, NodeId};
use crate::errors::AstError;

/// A slot owned by a container.
pub trait Member: fmt::Debug {
    /// Records `owner` as this slot's container and re-parents held nodes.
    fn register(&mut self, owner: NodeId);

    /// The container this slot is registered with.
    fn container(&self) -> Option<NodeId>;

    /// Claims this slot's nodes from the top of the shared stack.
    fn construct(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError>;

    /// Held nodes in match order.
    fn nodes(&self) -> Vec<&dyn Node>;
}

/// A node assembled from member slots.
pub trait Container: Node {
    /// Member slots in declaration order.
    fn members(&self) -> Vec<&dyn Member>;

    fn members_mut(&mut self) -> Vec<&mut dyn Member>;
}

/// Registers every member of `container` with it.
pub fn register_members<C: Container + ?Sized>(container: &mut C) {
    let owner = container.id();
    for member in container.members_mut() {
        member.register(owner);
    }
}

/// Runs one reduction pass: members claim stack nodes in reverse
/// declaration order.
pub fn reduce<C: Container + ?Sized>(
    container: &mut C,
    cx: &mut BuildContext<'_>,
) -> Result<(), AstError> {
    let owner = container.id();
    let mut cx = cx.assembling(owner);
    let before = cx.stack().len();
    for member in container.members_mut().into_iter().rev() {
        member.construct(&mut cx)?;
    }
    trace!(
        container = container.kind().name(),
        consumed = before.saturating_sub(cx.stack().len()),
        "reduced members"
    );
    Ok(())
}

/// Nodes held by all members, in declaration order.
pub fn member_children<C: Container + ?Sized>(container: &C) -> Vec<&dyn Node> {
    container
        .members()
        .into_iter()
        .flat_map(|member| member.nodes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstStack, Create, List, NodeHeader, Opt, Ptr};
    use crate::config::FaultPolicy;
    use crate::syntax::Span;
    use crate::{abstract_class, impl_node};

    abstract_class!(Part);

    #[derive(Debug, Clone, Default)]
    struct Letter {
        header: NodeHeader,
        ch: char,
    }

    impl_node!(Letter: Part);

    #[derive(Debug, Clone, Default)]
    struct Digit {
        header: NodeHeader,
    }

    impl_node!(Digit: Part);

    #[derive(Debug, Default)]
    struct Pair {
        header: NodeHeader,
        first: Ptr<Letter>,
        second: Ptr<Letter>,
    }

    impl_node!(Pair { first, second });

    #[derive(Debug, Default)]
    struct Tagged {
        header: NodeHeader,
        tag: Opt<Digit>,
        letters: List<Letter>,
        pair: Ptr<Pair>,
    }

    impl_node!(Tagged { tag, letters, pair });

    fn letter(ch: char) -> Box<dyn Node> {
        Box::new(Letter {
            ch,
            ..Letter::create()
        })
    }

    fn build<T: Create>(stack: &mut AstStack) -> Result<T, AstError> {
        let mut node = T::create();
        let mut cx = BuildContext::new(stack, "", Span::default(), 0, FaultPolicy::Strict);
        node.construct(&mut cx)?;
        Ok(node)
    }

    #[test]
    fn last_member_claims_stack_top() {
        let mut stack = AstStack::new();
        stack.push(letter('a'));
        stack.push(letter('b'));
        let pair: Pair = build(&mut stack).unwrap();
        assert!(stack.is_empty());
        assert_eq!(pair.first.get().map(|l| l.ch), Some('a'));
        assert_eq!(pair.second.get().map(|l| l.ch), Some('b'));
    }

    #[test]
    fn members_adopt_claimed_nodes() {
        let mut stack = AstStack::new();
        stack.push(letter('a'));
        stack.push(letter('b'));
        let pair: Pair = build(&mut stack).unwrap();
        for child in pair.children() {
            assert_eq!(child.parent(), Some(pair.id()));
        }
        assert_eq!(pair.members()[0].container(), Some(pair.id()));
    }

    #[test]
    fn nested_containers_reduce_in_match_order() {
        let mut stack = AstStack::new();
        stack.push(Box::new(Digit::create()));
        stack.push(letter('x'));
        stack.push(letter('y'));
        stack.push(letter('a'));
        stack.push(letter('b'));
        let pair: Pair = build(&mut stack).unwrap();
        stack.push(Box::new(pair));
        let tagged: Tagged = build(&mut stack).unwrap();

        assert!(stack.is_empty());
        assert!(tagged.tag.get().is_some());
        let letters: String = tagged.letters.iter().map(|l| l.ch).collect();
        assert_eq!(letters, "xy");
        let pair = tagged.pair.get().unwrap();
        assert_eq!(pair.parent(), Some(tagged.id()));
        assert_eq!(pair.second.get().map(|l| l.ch), Some('b'));
        assert_eq!(
            pair.second.get().and_then(|l| l.parent()),
            Some(pair.id())
        );
        assert_eq!(tagged.children().len(), 4);
    }

    #[test]
    fn copies_register_fresh_members() {
        let mut stack = AstStack::new();
        stack.push(letter('a'));
        stack.push(letter('b'));
        let pair: Pair = build(&mut stack).unwrap();
        let copy = pair.duplicate();
        assert_ne!(copy.id(), pair.id());
        for child in copy.children() {
            assert_eq!(child.parent(), Some(copy.id()));
        }
        let copy = copy.downcast::<Pair>().unwrap();
        assert_eq!(copy.members()[1].container(), Some(copy.id()));
    }

    #[test]
    fn clone_reparents_the_copied_children() {
        let mut stack = AstStack::new();
        stack.push(letter('x'));
        stack.push(letter('a'));
        stack.push(letter('b'));
        let pair: Pair = build(&mut stack).unwrap();
        stack.push(Box::new(pair));
        let tagged: Tagged = build(&mut stack).unwrap();

        let mut copy = tagged.clone();
        assert_ne!(copy.id(), tagged.id());
        for member in copy.members() {
            assert_eq!(member.container(), Some(copy.id()));
        }
        for child in copy.children() {
            assert_eq!(child.parent(), Some(copy.id()));
        }
        let inner = copy.pair.get().unwrap();
        assert_eq!(inner.first.get().and_then(|l| l.parent()), Some(inner.id()));

        let previous = copy.pair.replace(Box::new(Pair::create()));
        assert_eq!(previous.map(|p| p.parent()), Some(None));
        assert_eq!(copy.pair.get().and_then(|p| p.parent()), Some(copy.id()));
        assert_eq!(tagged.pair.get().and_then(|p| p.parent()), Some(tagged.id()));
    }
}
