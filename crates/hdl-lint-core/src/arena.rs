//! In-memory [`SyntaxTree`] built from nested node specifications.
//!
//! [`NodeSpec`] is the serialisable shape of a tree (it is what a tree dump
//! contains) and doubles as a compact way to hand-build fixtures in tests.
//! [`ArenaTree`] flattens it into a pre-order arena with first-child /
//! next-sibling links.

use crate::tree::{FileId, NodeId, NodeKind, SourceLocation, SyntaxTree};
use serde::{Deserialize, Serialize};

/// Errors raised while flattening a [`NodeSpec`] into an [`ArenaTree`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A node reported line 0; lines are 1-indexed.
    #[error("node of kind {kind:?} has line 0 (lines are 1-indexed)")]
    ZeroLine {
        /// Kind of the offending node.
        kind: NodeKind,
    },

    /// The tree has more nodes than a [`NodeId`] can address.
    #[error("tree exceeds {max} nodes")]
    TooLarge {
        /// Maximum supported node count.
        max: u32,
    },
}

/// Nested description of a syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Syntactic category.
    pub kind: NodeKind,
    /// Line number (1-indexed).
    pub line: u32,
    /// Symbol name; kept only on identifier nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// File the node comes from when it differs from its parent's
    /// (e.g. an `` `include ``d file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Ordered children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Creates a childless node.
    #[must_use]
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            line,
            name: None,
            file: None,
            children: Vec::new(),
        }
    }

    /// Creates an identifier node.
    #[must_use]
    pub fn ident(name: impl Into<String>, line: u32) -> Self {
        let mut spec = Self::new(NodeKind::Identifier, line);
        spec.name = Some(name.into());
        spec
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = NodeSpec>,
    {
        self.children.extend(children);
        self
    }

    /// Marks the node (and, by inheritance, its subtree) as coming from `path`.
    #[must_use]
    pub fn in_file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self
    }
}

// Deep expression chains would overflow the stack with the derived,
// recursive drop.
impl Drop for NodeSpec {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[derive(Debug, Clone)]
struct ArenaNode {
    kind: NodeKind,
    name: Option<String>,
    location: SourceLocation,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

/// Immutable pre-order arena implementing [`SyntaxTree`].
#[derive(Debug, Clone)]
pub struct ArenaTree {
    nodes: Vec<ArenaNode>,
}

impl ArenaTree {
    /// Flattens `root`, placing every node in `file`.
    ///
    /// `file` fields on the specs are ignored; use [`ArenaTree::from_spec_with`]
    /// to map them.
    ///
    /// # Errors
    ///
    /// Returns an error if a node has line 0 or the tree is too large.
    pub fn from_spec(root: &NodeSpec, file: FileId) -> Result<Self, TreeError> {
        Self::from_spec_with(root, file, |_| file)
    }

    /// Flattens `root`, resolving `file` fields through `resolve_file`.
    ///
    /// Nodes without a `file` field inherit their parent's file; the root
    /// defaults to `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if a node has line 0 or the tree is too large.
    pub fn from_spec_with<F>(
        root: &NodeSpec,
        file: FileId,
        mut resolve_file: F,
    ) -> Result<Self, TreeError>
    where
        F: FnMut(&str) -> FileId,
    {
        let mut nodes: Vec<ArenaNode> = Vec::new();
        let mut last_child: Vec<Option<NodeId>> = Vec::new();
        let mut stack: Vec<(&NodeSpec, Option<NodeId>, FileId)> = vec![(root, None, file)];

        while let Some((spec, parent, inherited_file)) = stack.pop() {
            if spec.line == 0 {
                return Err(TreeError::ZeroLine { kind: spec.kind });
            }

            let id = NodeId::new(
                u32::try_from(nodes.len()).map_err(|_| TreeError::TooLarge { max: u32::MAX })?,
            );
            let node_file = spec.file.as_deref().map_or(inherited_file, &mut resolve_file);

            nodes.push(ArenaNode {
                kind: spec.kind,
                name: spec
                    .name
                    .clone()
                    .filter(|_| spec.kind.is_identifier()),
                location: SourceLocation::new(node_file, spec.line),
                first_child: None,
                next_sibling: None,
            });
            last_child.push(None);

            if let Some(parent) = parent {
                let slot = parent.index() as usize;
                match last_child[slot] {
                    Some(prev) => nodes[prev.index() as usize].next_sibling = Some(id),
                    None => nodes[slot].first_child = Some(id),
                }
                last_child[slot] = Some(id);
            }

            for child in spec.children.iter().rev() {
                stack.push((child, Some(id), node_file));
            }
        }

        Ok(Self { nodes })
    }

    /// Creates a tree holding a single node.
    #[must_use]
    pub fn leaf(kind: NodeKind, location: SourceLocation) -> Self {
        Self {
            nodes: vec![ArenaNode {
                kind,
                name: None,
                location,
                first_child: None,
                next_sibling: None,
            }],
        }
    }

    /// Returns the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes (never the case once built).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &ArenaNode {
        &self.nodes[id.index() as usize]
    }
}

impl SyntaxTree for ArenaTree {
    fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).first_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).next_sibling
    }

    fn symbol_name(&self, node: NodeId) -> Option<&str> {
        self.node(node).name.as_deref()
    }

    fn location(&self, node: NodeId) -> SourceLocation {
        self.node(node).location
    }
}
