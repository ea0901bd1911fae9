//! Rule bindings: which node to build when a grammar rule matches.
//!
//! A [`RuleBindings`] maps grammar rules to factories. When the engine
//! reports a successful match of a bound rule, the driver runs its factory
//! against a [`BuildContext`]; the factory normally pushes one node onto the
//! shared stack. Matches of unbound rules produce no node, so their children
//! stay on the stack for an enclosing bound rule to claim.
//!
//! # Summary
//! | Method           | Builds                                           |
//! |------------------|--------------------------------------------------|
//! | `bind`           | one `T` per match, members reduced from the stack |
//! | `bind_fn`        | whatever the factory pushes                      |
//! | `bind_left_fold` | nested `T`s folding `a op b op c` to the left    |
//!
//! Every `bind*` call replaces an existing binding for the same rule and
//! returns the previous factory.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::ast::{BuildContext, Class, Create};
use crate::errors::AstError;
use crate::syntax::Span;

/// Builds the node for one rule match and pushes it onto the stack.
pub type Factory = Box<dyn Fn(&mut BuildContext<'_>) -> Result<(), AstError> + Send + Sync>;

/// Source of factories consulted by the driver.
pub trait ParseDelegate<R> {
    /// The factory bound to `rule`, if any.
    fn factory(&self, rule: R) -> Option<&Factory>;
}

impl<R, D: ParseDelegate<R> + ?Sized> ParseDelegate<R> for &D {
    fn factory(&self, rule: R) -> Option<&Factory> {
        (**self).factory(rule)
    }
}

/// Rule to factory table.
pub struct RuleBindings<R> {
    factories: HashMap<R, Factory>,
}

impl<R> RuleBindings<R>
where
    R: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `rule` to node type `T`.
    ///
    /// Each match creates a fresh `T` spanning the match, lets its members
    /// claim their children from the stack, and pushes it.
    ///
    /// # Example
    /// ```rust
    /// use pegast::ast::NodeHeader;
    /// use pegast::registry::RuleBindings;
    /// use pegast::impl_node;
    ///
    /// #[derive(Debug, Clone, Default)]
    /// struct Unit {
    ///     header: NodeHeader,
    /// }
    /// impl_node!(Unit);
    ///
    /// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// enum Rule { Unit }
    ///
    /// let mut bindings = RuleBindings::new();
    /// assert!(bindings.bind::<Unit>(Rule::Unit).is_none());
    /// assert!(bindings.bind::<Unit>(Rule::Unit).is_some());
    /// assert!(bindings.is_bound(Rule::Unit));
    /// ```
    pub fn bind<T: Create>(&mut self, rule: R) -> Option<Factory> {
        self.bind_fn(rule, move |cx| {
            let mut node = T::create();
            node.header_mut().set_span(cx.span());
            node.construct(cx)?;
            debug!(rule = ?rule, node = node.kind().name(), span = ?cx.span(), "built node");
            cx.stack_mut().push(Box::new(node));
            Ok(())
        })
    }

    /// Binds `rule` to an arbitrary factory.
    ///
    /// The factory is expected to replace the nodes its match pushed with one
    /// node of its own. Nothing enforces this: a factory that pushes nothing
    /// or leaves extra nodes behind only shows up in the final depth check.
    pub fn bind_fn<F>(&mut self, rule: R, factory: F) -> Option<Factory>
    where
        F: Fn(&mut BuildContext<'_>) -> Result<(), AstError> + Send + Sync + 'static,
    {
        self.factories.insert(rule, Box::new(factory))
    }

    /// Binds a rule of shape `Operand (Operator Operand)*` to container `T`.
    ///
    /// The nodes the match pushed are folded to the left: `a + b - c` builds
    /// `T(T(a, +, b), -, c)`, each `T` reduced from the stack like any other
    /// container. A single operand passes through unwrapped.
    pub fn bind_left_fold<T: Create + Class>(&mut self, rule: R) -> Option<Factory> {
        self.bind_fn(rule, move |cx| {
            let base = cx.base();
            let mut matched = cx.stack_mut().split_off(base).into_iter();
            let Some(first) = matched.next() else {
                return cx.fault(AstError::MissingNode {
                    expected: <T as Class>::kind().name(),
                    span: cx.span(),
                });
            };
            let start = first.span().start;
            cx.stack_mut().push(first);
            let mut folds = 0usize;
            while let Some(operator) = matched.next() {
                let mut end = operator.span().end;
                cx.stack_mut().push(operator);
                if let Some(operand) = matched.next() {
                    end = operand.span().end;
                    cx.stack_mut().push(operand);
                }
                let mut node = T::create();
                node.header_mut().set_span(Span::new(start, end));
                node.construct(cx)?;
                cx.stack_mut().push(Box::new(node));
                folds += 1;
            }
            debug!(rule = ?rule, node = <T as Class>::kind().name(), folds, "folded operands");
            Ok(())
        })
    }

    /// Removes the binding for `rule`, returning its factory.
    pub fn unbind(&mut self, rule: R) -> Option<Factory> {
        self.factories.remove(&rule)
    }

    pub fn is_bound(&self, rule: R) -> bool {
        self.factories.contains_key(&rule)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Bound rules, in no particular order.
    pub fn rules(&self) -> impl Iterator<Item = R> + '_ {
        self.factories.keys().copied()
    }
}

impl<R> Default for RuleBindings<R> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<R: Eq + Hash> ParseDelegate<R> for RuleBindings<R> {
    fn factory(&self, rule: R) -> Option<&Factory> {
        self.factories.get(&rule)
    }
}

impl<R: fmt::Debug> fmt::Debug for RuleBindings<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBindings")
            .field("rules", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
