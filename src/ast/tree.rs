//! Tree inspection: id lookup, parent resolution and dumps.

use std::fmt::Write as _;

use serde::Serialize;

use super::node::{Node, NodeId};
use crate::syntax::Span;

/// Finds the node with `id` in the tree rooted at `root`.
pub fn find(root: &dyn Node, id: NodeId) -> Option<&dyn Node> {
    if root.id() == id {
        return Some(root);
    }
    root.children().into_iter().find_map(|child| find(child, id))
}

/// Resolves `node`'s parent link within the tree rooted at `root`.
pub fn parent_of<'a>(root: &'a dyn Node, node: &dyn Node) -> Option<&'a dyn Node> {
    find(root, node.parent()?)
}

/// Owned snapshot of a tree, serializable for external tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeDump {
    pub kind: &'static str,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeDump>,
}

impl TreeDump {
    pub fn of(node: &dyn Node) -> Self {
        Self {
            kind: node.kind().name(),
            span: node.span(),
            label: node.label(),
            children: node.children().into_iter().map(TreeDump::of).collect(),
        }
    }

    /// Compact form: `(BinaryOp (Num 1) (AddOp +) (Num 2))`.
    pub fn sexpr(&self) -> String {
        let mut out = String::new();
        self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind);
        if let Some(label) = &self.label {
            out.push(' ');
            out.push_str(label);
        }
        for child in &self.children {
            out.push(' ');
            child.write_sexpr(out);
        }
        out.push(')');
    }

    /// One line per node, indented by depth.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let _ = write!(out, "{:indent$}{}", "", self.kind, indent = depth * 2);
        if let Some(label) = &self.label {
            let _ = write!(out, " {label:?}");
        }
        let _ = writeln!(out, " @{}..{}", self.span.start, self.span.end);
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }

    /// Number of nodes in the snapshot.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeDump::size).sum::<usize>()
    }
}
