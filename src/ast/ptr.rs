//! Single-child member slot.

use std::fmt;

use tracing::trace;

use super::container::Member;
use super::context::BuildContext;
use super::kind::Class;
use super::node::{Node, NodeId};
use crate::errors::AstError;

/// Owns zero or one child of class `T`.
///
/// During reduction it pops the stack top if that top is a `T`. A mandatory
/// slot (`OPTIONAL = false`) reports a fault when it cannot; if the policy
/// tolerates the fault, the mismatched top is still popped and discarded and
/// the slot stays empty. An optional slot stays empty and leaves the stack
/// untouched.
///
/// Cloning duplicates the held child. The copy is unregistered until the
/// container holding it registers its members.
pub struct Ptr<T: Class, const OPTIONAL: bool = false> {
    value: Option<Box<T::Target>>,
    owner: Option<NodeId>,
}

/// Optional single-child slot.
pub type Opt<T> = Ptr<T, true>;

impl<T: Class, const OPTIONAL: bool> Ptr<T, OPTIONAL> {
    /// An empty, unregistered slot.
    pub fn new() -> Self {
        Self {
            value: None,
            owner: None,
        }
    }

    /// The held child, if any.
    pub fn get(&self) -> Option<&T::Target> {
        self.value.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T::Target> {
        self.value.as_deref_mut()
    }

    /// True if the slot holds a child.
    pub fn is_some(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.value.is_none()
    }

    /// Drops the held child and installs a copy of `value`.
    pub fn assign(&mut self, value: Option<&T::Target>) {
        self.value = None;
        self.value = value.map(|value| T::duplicate(value));
        self.adopt();
    }

    /// Installs `value` without copying, returning the previous child.
    pub fn replace(&mut self, value: Box<T::Target>) -> Option<Box<T::Target>> {
        let previous = self.take();
        self.value = Some(value);
        self.adopt();
        previous
    }

    /// Removes the held child; it no longer has a parent.
    pub fn take(&mut self) -> Option<Box<T::Target>> {
        let mut value = self.value.take()?;
        value.header_mut().adopt(None);
        Some(value)
    }

    fn adopt(&mut self) {
        let owner = self.owner;
        if let Some(value) = self.value.as_deref_mut() {
            value.header_mut().adopt(owner);
        }
    }
}

impl<T: Class, const OPTIONAL: bool> Member for Ptr<T, OPTIONAL> {
    fn register(&mut self, owner: NodeId) {
        self.owner = Some(owner);
        self.adopt();
    }

    fn container(&self) -> Option<NodeId> {
        self.owner
    }

    fn construct(&mut self, cx: &mut BuildContext<'_>) -> Result<(), AstError> {
        if let Some(owner) = cx.owner() {
            self.owner = Some(owner);
        }
        match cx.stack_mut().pop_as::<T>() {
            Some(node) => {
                trace!(class = T::kind().name(), optional = OPTIONAL, "member claimed node");
                self.value = Some(node);
                self.adopt();
                Ok(())
            }
            None if OPTIONAL => {
                trace!(class = T::kind().name(), "optional member left empty");
                Ok(())
            }
            None => {
                cx.fault(cx.missing::<T>())?;
                if let Some(discarded) = cx.stack_mut().pop() {
                    trace!(
                        class = T::kind().name(),
                        found = discarded.kind().name(),
                        "mandatory member discarded mismatched node"
                    );
                }
                Ok(())
            }
        }
    }

    fn nodes(&self) -> Vec<&dyn Node> {
        self.value.as_deref().map(T::as_node).into_iter().collect()
    }
}

impl<T: Class, const OPTIONAL: bool> Default for Ptr<T, OPTIONAL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Class, const OPTIONAL: bool> Clone for Ptr<T, OPTIONAL> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.as_deref().map(|value| T::duplicate(value)),
            owner: None,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source.get());
    }
}

impl<T: Class, const OPTIONAL: bool> fmt::Debug for Ptr<T, OPTIONAL> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_deref() {
            Some(value) => f.debug_tuple("Ptr").field(&T::as_node(value)).finish(),
            None => f.write_str("Ptr(None)"),
        }
    }
}
