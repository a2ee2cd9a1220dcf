//! Compilation units and the design that owns them.

use crate::tree::{FileId, NodeId, SourceLocation, SyntaxTree};

/// Whether a unit's tree can be trusted by rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// The tree is complete.
    Valid,
    /// The front-end could not build a complete tree.
    Invalid {
        /// Provider-supplied explanation.
        reason: String,
    },
}

impl UnitStatus {
    /// Returns true for [`UnitStatus::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// One parsed top-level source file and its tree.
///
/// Borrowed from a [`Design`] for the duration of a run.
#[derive(Clone, Copy)]
pub struct CompilationUnit<'a> {
    /// Name used in skip notices and fatal events.
    pub name: &'a str,
    /// Primary file of the unit.
    pub file: FileId,
    /// Syntax tree of the unit.
    pub tree: &'a dyn SyntaxTree,
    /// Validity of the tree.
    pub status: &'a UnitStatus,
}

impl<'a> CompilationUnit<'a> {
    /// Creates a unit view.
    #[must_use]
    pub fn new(
        name: &'a str,
        file: FileId,
        tree: &'a dyn SyntaxTree,
        status: &'a UnitStatus,
    ) -> Self {
        Self {
            name,
            file,
            tree,
            status,
        }
    }

    /// Returns the root node of the unit's tree.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Returns the location of the root node.
    #[must_use]
    pub fn root_location(&self) -> SourceLocation {
        self.tree.location(self.tree.root())
    }

    /// Returns true if rules may run on this unit.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

impl std::fmt::Debug for CompilationUnit<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationUnit")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Provider of compilation units plus the file table their locations
/// refer to.
pub trait Design: Send + Sync {
    /// Returns the units in a stable order.
    fn compilation_units(&self) -> Vec<CompilationUnit<'_>>;

    /// Resolves a file id to a human-readable path.
    fn resolve_path(&self, file: FileId) -> Option<&str>;
}
