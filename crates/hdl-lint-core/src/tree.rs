//! Syntax tree abstraction consumed by rules.
//!
//! The engine never owns or builds the tree of a real design. An upstream
//! parser front-end supplies it through the [`SyntaxTree`] trait, and the
//! engine only holds borrowed [`NodeId`] handles into it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node inside a [`SyntaxTree`].
///
/// A handle is only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a handle from a provider-specific index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the provider-specific index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Opaque source file identifier.
///
/// Resolved to a human-readable path only by the design that owns the
/// file table (see [`crate::Design::resolve_path`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u32);

impl FileId {
    /// Creates a file identifier from a file-table index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the file-table index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Source position of a node: file plus 1-indexed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File the node was parsed from.
    pub file: FileId,
    /// Line number (1-indexed).
    pub line: u32,
}

impl SourceLocation {
    /// Creates a new location.
    #[must_use]
    pub const fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }
}

/// Syntactic category of a node.
///
/// Names follow the SystemVerilog grammar productions the front-end
/// reports. Categories no rule cares about collapse into [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Root of a compilation unit.
    SourceText,
    /// Top-level description item.
    Description,
    /// `module ... endmodule`
    ModuleDeclaration,
    /// `interface ... endinterface`
    InterfaceDeclaration,
    /// `package ... endpackage`
    PackageDeclaration,
    /// `class ... endclass`
    ClassDeclaration,
    /// Item inside a class body.
    ClassItem,
    /// Class data member.
    ClassProperty,
    /// Class method (task, function or prototype).
    ClassMethod,
    /// `function <type> name(...)` header without body.
    FunctionPrototype,
    /// `task name(...)` header without body.
    TaskPrototype,
    /// Return type position of a function prototype: explicit or implicit.
    FunctionDataTypeOrImplicit,
    /// Explicit function return type.
    FunctionDataType,
    /// Formal argument list of a task or function.
    TfPortList,
    /// Interface item that is not a port.
    NonPortInterfaceItem,
    /// Module item that is not a port.
    NonPortModuleItem,
    /// `extern task` / `extern function` declaration.
    ExternTfDeclaration,
    /// Data (variable) declaration.
    DataDeclaration,
    /// Variable declaration body.
    VariableDeclaration,
    /// List of declared variables with optional initialisers.
    ListOfVariableDeclAssignments,
    /// One declared variable.
    VariableDeclAssignment,
    /// Packed dimension such as `[3:0]`.
    PackedDimension,
    /// Unpacked dimension such as `[8]`.
    UnpackedDimension,
    /// Unsized dimension `[]`.
    UnsizedDimension,
    /// Range expression inside a dimension.
    ConstantRange,
    /// Net type keyword (`wire`, `tri`, ...).
    NetType,
    /// Explicit data type.
    DataType,
    /// `byte`, `shortint`, `int`, `longint`, `integer`, `time`
    IntegerAtomType,
    /// `bit`, `logic`, `reg` as an integer vector type.
    IntegerVectorType,
    /// `shortreal`, `real`, `realtime`
    NonIntegerType,
    /// `string`
    StringType,
    /// Class type reference.
    ClassType,
    /// `bit` keyword token.
    IntVecTypeBit,
    /// `logic` keyword token.
    IntVecTypeLogic,
    /// `reg` keyword token.
    IntVecTypeReg,
    /// `parameter` declaration.
    ParameterDeclaration,
    /// `localparam` declaration.
    LocalParameterDeclaration,
    /// List of parameter assignments.
    ListOfParamAssignments,
    /// One parameter assignment.
    ParamAssignment,
    /// `automatic` lifetime qualifier.
    LifetimeAutomatic,
    /// `static` lifetime qualifier.
    LifetimeStatic,
    /// Sequence expression in an assertion.
    SequenceExpr,
    /// Reference to a named sequence.
    SequenceInstance,
    /// `[* n]` repetition.
    ConsecutiveRepetition,
    /// `[= n]` repetition.
    NonConsecutiveRepetition,
    /// `[-> n]` repetition.
    GotoRepetition,
    /// Interface port such as `bus_if.mp port`.
    InterfacePortHeader,
    /// `virtual interface` data type.
    VirtualInterfaceType,
    /// Dotted path such as `top.u_bus`.
    HierarchicalIdentifier,
    /// `import`/`export` of a DPI subroutine.
    DpiImportExport,
    /// The `"DPI"` specification string.
    DpiSpecStringDpi,
    /// The `"DPI-C"` specification string.
    DpiSpecStringDpiC,
    /// `covergroup ... endgroup`
    CovergroupDeclaration,
    /// `coverpoint` item.
    CoverPoint,
    /// `++`/`--` expression.
    IncOrDecExpression,
    /// Assignment used as an expression, e.g. `(a += 1)`.
    OperatorAssignment,
    /// Identifier token.
    #[serde(alias = "string_const")]
    Identifier,
    /// Numeric literal.
    Number,
    /// Expression.
    Expression,
    /// Any category the engine does not distinguish.
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// Returns true for identifier-class nodes, the only ones carrying a
    /// symbol name.
    #[must_use]
    pub const fn is_identifier(self) -> bool {
        matches!(self, Self::Identifier)
    }
}

/// Read-only view of one compilation unit's syntax tree.
///
/// Implemented by adapters over a concrete parser. The tree must be fully
/// built and never mutated while the engine holds it, so implementations
/// are shared across worker threads without locking.
pub trait SyntaxTree: Send + Sync {
    /// Returns the root node.
    fn root(&self) -> NodeId;

    /// Returns the syntactic category of `node`.
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Returns the first child of `node`, if any.
    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the next sibling of `node`, if any.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the symbol name of an identifier node.
    ///
    /// Implementations return `None` for every non-identifier node.
    fn symbol_name(&self, node: NodeId) -> Option<&str>;

    /// Returns the source location of `node`.
    fn location(&self, node: NodeId) -> SourceLocation;
}
