//! The per-parse LIFO of built but unclaimed nodes.

use super::kind::{Class, Kind};
use super::node::Node;

/// Shared reduction stack.
///
/// Nodes on the stack are owned by it alone until a member slot or the
/// driver pops them.
#[derive(Debug, Default)]
pub struct AstStack {
    nodes: Vec<Box<dyn Node>>,
}

impl AstStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: Box<dyn Node>) {
        self.nodes.push(node);
    }

    pub fn pop(&mut self) -> Option<Box<dyn Node>> {
        self.nodes.pop()
    }

    pub fn top(&self) -> Option<&dyn Node> {
        self.nodes.last().map(|node| node.as_ref())
    }

    /// Kind of the top node, if any.
    pub fn top_kind(&self) -> Option<&'static Kind> {
        self.top().map(|node| node.kind())
    }

    /// Pops the top node if it is a `T`; otherwise leaves the stack as is.
    pub fn pop_as<T: Class>(&mut self) -> Option<Box<T::Target>> {
        if !self.top()?.isa::<T>() {
            return None;
        }
        let node = self.nodes.pop()?;
        match T::downcast(node) {
            Ok(target) => Some(target),
            Err(node) => {
                self.nodes.push(node);
                None
            }
        }
    }

    /// Removes and returns every node from `base` upwards, bottom first.
    pub fn split_off(&mut self, base: usize) -> Vec<Box<dyn Node>> {
        let base = base.min(self.nodes.len());
        self.nodes.split_off(base)
    }

    /// Removes every node, bottom first.
    pub fn drain(&mut self) -> Vec<Box<dyn Node>> {
        std::mem::take(&mut self.nodes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Node> + '_ {
        self.nodes.iter().map(|node| node.as_ref())
    }
}
