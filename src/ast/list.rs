//! Many-children member slot.

use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use super::container::Member;
use super::context::BuildContext;
use super::kind::Class;
use super::node::{Node, NodeId};
use crate::errors::AstError;

/// Owns an ordered sequence of children of class `T`.
///
/// Reduction pops the stack top while it is a `T`, prepending each node, so
/// the list ends up in match order. It stops at the first other node or
/// when the stack runs out; an empty list is valid.
pub struct List<T: Class> {
    items: VecDeque<Box<T::Target>>,
    owner: Option<NodeId>,
}

impl<T: Class> List<T> {
    /// An empty, unregistered list.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
            owner: None,
        }
    }

    /// Number of children held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The child at `index`, counting in match order.
    pub fn get(&self, index: usize) -> Option<&T::Target> {
        self.items.get(index).map(|item| &**item)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T::Target> {
        self.items.get_mut(index).map(|item| &mut **item)
    }

    /// The earliest matched child.
    pub fn first(&self) -> Option<&T::Target> {
        self.get(0)
    }

    /// The latest matched child.
    pub fn last(&self) -> Option<&T::Target> {
        self.items.back().map(|item| &**item)
    }

    /// Iterates in match order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.items.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T::Target> + '_ {
        self.items.iter_mut().map(|item| &mut **item)
    }

    /// Appends `item` without copying.
    pub fn push(&mut self, mut item: Box<T::Target>) {
        item.header_mut().adopt(self.owner);
        self.items.push_back(item);
    }

    /// Drops every child and installs copies of `source`'s children.
    pub fn assign(&mut self, source: &List<T>) {
        self.items.clear();
        for item in &source.items {
            self.push(T::duplicate(item));
        }
    }

    /// Removes all children; they no longer have a parent.
    pub fn take_all(&mut self) -> Vec<Box<T::Target>> {
        self.items
            .drain(..)
            .map(|mut item| {
                item.header_mut().adopt(None);
                item
            })
            .collect()
    }

    /// Drops every child.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Class> Member for List<T> {
    fn register(&mut self, owner: NodeId) {
        self.owner = Some(owner);
        for item in self.items.iter_mut() {
            item.header_mut().adopt(Some(owner));
        }
    }

    fn container(&self) -> Option<NodeId> {
        self.owner
    }

    fn construct(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        if let Some(owner) = cx.owner() {
            self.owner = Some(owner);
        }
        let mut claimed = 0usize;
        while let Some(mut item) = cx.stack_mut().pop_as::<T>() {
            item.header_mut().adopt(self.owner);
            self.items.push_front(item);
            claimed += 1;
        }
        trace!(class = T::kind().name(), claimed, "list member claimed nodes");
        Ok(())
    }

    fn nodes(&self) -> Vec<&dyn Node> {
        self.items.iter().map(|item| T::as_node(item)).collect()
    }
}

impl<T: Class> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Class> Clone for List<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.iter().map(|item| T::duplicate(item)).collect(),
            owner: None,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<T: Class> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|item| T::as_node(item)))
            .finish()
    }
}

/// Iterator over a [`List`] in match order.
pub struct Iter<'a, T: Class> {
    inner: std::collections::vec_deque::Iter<'a, Box<T::Target>>,
}

impl<'a, T: Class> Iterator for Iter<'a, T> {
    type Item = &'a T::Target;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| &**item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Class> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|item| &**item)
    }
}

impl<'a, T: Class> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T: Class> IntoIterator for &'a List<T> {
    type Item = &'a T::Target;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
