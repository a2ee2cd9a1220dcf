//! Traversal helpers built on the [`SyntaxTree`] primitives.
//!
//! Every function is pure and parameterised by the tree it reads, so rules
//! can call them from any worker thread.

use crate::tree::{NodeId, NodeKind, SourceLocation, SyntaxTree};

/// How far below a node a search looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Direct children only.
    Children,
    /// The whole subtree, excluding the node itself.
    Subtree,
}

/// Iterator over the direct children of a node.
pub struct Children<'t> {
    tree: &'t dyn SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Iterator over the nodes of a subtree in document order.
pub struct Descendants<'t> {
    tree: &'t dyn SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        if let Some(sibling) = self.tree.next_sibling(current) {
            self.stack.push(sibling);
        }
        if let Some(child) = self.tree.first_child(current) {
            self.stack.push(child);
        }
        Some(current)
    }
}

/// Returns the first child of `node`.
#[must_use]
pub fn first_child(tree: &dyn SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.first_child(node)
}

/// Returns the next sibling of `node`.
#[must_use]
pub fn next_sibling(tree: &dyn SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.next_sibling(node)
}

/// Iterates over the direct children of `node`, in order.
#[must_use]
pub fn children(tree: &dyn SyntaxTree, node: NodeId) -> Children<'_> {
    Children {
        tree,
        next: tree.first_child(node),
    }
}

/// Iterates over the siblings after `node`, in order.
#[must_use]
pub fn following_siblings(tree: &dyn SyntaxTree, node: NodeId) -> Children<'_> {
    Children {
        tree,
        next: tree.next_sibling(node),
    }
}

/// Iterates over every node below `node` in document order
/// (pre-order, depth-first).
#[must_use]
pub fn descendants(tree: &dyn SyntaxTree, node: NodeId) -> Descendants<'_> {
    Descendants {
        tree,
        stack: tree.first_child(node).into_iter().collect(),
    }
}

/// Collects the nodes below `node` whose kind is in `kinds`.
///
/// Results are in document order. `node` itself is never included.
#[must_use]
pub fn collect_descendants(
    tree: &dyn SyntaxTree,
    node: NodeId,
    kinds: &[NodeKind],
    scope: Scope,
) -> Vec<NodeId> {
    scan(tree, node, scope)
        .filter(|&n| kinds.contains(&tree.kind(n)))
        .collect()
}

/// Returns the first node below `node` whose kind is in `kinds`.
#[must_use]
pub fn find_first(
    tree: &dyn SyntaxTree,
    node: NodeId,
    kinds: &[NodeKind],
    scope: Scope,
) -> Option<NodeId> {
    scan(tree, node, scope).find(|&n| kinds.contains(&tree.kind(n)))
}

/// Returns true if any node below `node` has a kind in `kinds`.
#[must_use]
pub fn contains_any(tree: &dyn SyntaxTree, node: NodeId, kinds: &[NodeKind], scope: Scope) -> bool {
    find_first(tree, node, kinds, scope).is_some()
}

/// Returns the symbol name of an identifier node.
///
/// Non-identifier nodes always yield `None`, whatever the provider stores.
#[must_use]
pub fn symbol_name(tree: &dyn SyntaxTree, node: NodeId) -> Option<&str> {
    if tree.kind(node).is_identifier() {
        tree.symbol_name(node)
    } else {
        None
    }
}

/// Returns the name of the first identifier in `nodes`.
#[must_use]
pub fn first_identifier<'t, I>(tree: &'t dyn SyntaxTree, nodes: I) -> Option<&'t str>
where
    I: IntoIterator<Item = NodeId>,
{
    nodes.into_iter().find_map(|n| symbol_name(tree, n))
}

/// Returns the source location of `node`.
#[must_use]
pub fn location(tree: &dyn SyntaxTree, node: NodeId) -> SourceLocation {
    tree.location(node)
}

fn scan<'t>(
    tree: &'t dyn SyntaxTree,
    node: NodeId,
    scope: Scope,
) -> Box<dyn Iterator<Item = NodeId> + 't> {
    match scope {
        Scope::Children => Box::new(children(tree, node)),
        Scope::Subtree => Box::new(descendants(tree, node)),
    }
}
