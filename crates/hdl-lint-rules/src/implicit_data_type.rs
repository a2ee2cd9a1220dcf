//! Rule to flag vector declarations that rely on an implicit data type.
//!
//! # Rationale
//!
//! `var [7:0] x;` declares an 8-bit vector whose element type is implied.
//! Writing the type (`logic [7:0] x;`) makes the intent explicit and keeps
//! 2-state/4-state semantics from depending on defaults.
//!
//! # Configuration
//!
//! - `placeholder_name`: Name reported when the variable name cannot be
//!   resolved (default: `<unknown>`)

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for implicit-data-type.
pub const ID: &str = "IMPLICIT_DATA_TYPE_IN_DECLARATION";

/// Rule name for implicit-data-type.
pub const NAME: &str = "implicit-data-type";

/// Name reported when no variable identifier is found.
pub const DEFAULT_PLACEHOLDER: &str = "<unknown>";

/// Kinds whose presence makes a declaration's type explicit.
const EXPLICIT_TYPES: &[NodeKind] = &[
    NodeKind::NetType,
    NodeKind::DataType,
    NodeKind::IntegerAtomType,
    NodeKind::IntegerVectorType,
    NodeKind::NonIntegerType,
    NodeKind::StringType,
    NodeKind::ClassType,
    NodeKind::IntVecTypeBit,
];

/// Flags packed declarations without an explicit data type.
#[derive(Debug, Clone)]
pub struct ImplicitDataType {
    /// Name reported when the variable name cannot be resolved.
    pub placeholder_name: String,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ImplicitDataType {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplicitDataType {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placeholder_name: DEFAULT_PLACEHOLDER.to_string(),
            severity: Severity::Error,
        }
    }

    /// Sets the placeholder name.
    #[must_use]
    pub fn placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for ImplicitDataType {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags packed variable declarations without an explicit data type"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        for decl in
            query::collect_descendants(tree, unit.root(), &[NodeKind::DataDeclaration], Scope::Subtree)
        {
            let Some(dim) = query::find_first(tree, decl, &[NodeKind::PackedDimension], Scope::Subtree)
            else {
                continue;
            };
            if query::contains_any(tree, decl, EXPLICIT_TYPES, Scope::Subtree) {
                continue;
            }

            let name = variable_name(tree, decl).unwrap_or(self.placeholder_name.as_str());
            diagnostics.push(Diagnostic::new(
                ID,
                self.severity,
                tree.location(dim),
                format!("variable '{name}' declared without explicit type"),
            ));
        }

        Ok(diagnostics)
    }
}

/// Name of the first declared variable: the identifier that opens a
/// `variable_decl_assignment`.
fn variable_name(tree: &dyn SyntaxTree, decl: NodeId) -> Option<&str> {
    query::collect_descendants(
        tree,
        decl,
        &[NodeKind::ListOfVariableDeclAssignments],
        Scope::Subtree,
    )
    .into_iter()
    .flat_map(|list| {
        query::collect_descendants(tree, list, &[NodeKind::VariableDeclAssignment], Scope::Subtree)
    })
    .find_map(|assign| {
        tree.first_child(assign)
            .and_then(|first| query::symbol_name(tree, first))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl_lint_core::{ArenaTree, FileId, NodeSpec, UnitStatus};

    fn check_tree(rule: &ImplicitDataType, root: NodeSpec) -> Vec<Diagnostic> {
        let tree = ArenaTree::from_spec(&root, FileId::new(0)).unwrap();
        let status = UnitStatus::Valid;
        let unit = CompilationUnit::new("t", FileId::new(0), &tree, &status);
        rule.evaluate(&unit).unwrap()
    }

    fn check(root: NodeSpec) -> Vec<Diagnostic> {
        check_tree(&ImplicitDataType::new(), root)
    }

    /// `var [3:0] <name>;` on `line`, with `extra` placed in the declaration.
    fn declaration(line: u32, name: Option<&str>, extra: Option<NodeKind>) -> NodeSpec {
        let mut assign = NodeSpec::new(NodeKind::VariableDeclAssignment, line);
        if let Some(name) = name {
            assign = assign.child(NodeSpec::ident(name, line));
        }
        let mut decl = NodeSpec::new(NodeKind::DataDeclaration, line);
        if let Some(kind) = extra {
            decl = decl.child(NodeSpec::new(kind, line));
        }
        decl.children([
            NodeSpec::new(NodeKind::PackedDimension, line)
                .child(NodeSpec::new(NodeKind::ConstantRange, line)),
            NodeSpec::new(NodeKind::ListOfVariableDeclAssignments, line).child(assign),
        ])
    }

    fn unit(decls: impl IntoIterator<Item = NodeSpec>) -> NodeSpec {
        NodeSpec::new(NodeKind::SourceText, 1).child(
            NodeSpec::new(NodeKind::ModuleDeclaration, 1)
                .child(NodeSpec::ident("top", 1))
                .children(decls),
        )
    }

    #[test]
    fn test_detects_implicit_vector() {
        let diagnostics = check(unit([declaration(3, Some("foo"), None)]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule_id, ID);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].location.line, 3);
        assert_eq!(
            diagnostics[0].message,
            "variable 'foo' declared without explicit type"
        );
    }

    #[test]
    fn test_explicit_types_are_accepted() {
        for kind in EXPLICIT_TYPES {
            let diagnostics = check(unit([declaration(3, Some("foo"), Some(*kind))]));
            assert!(diagnostics.is_empty(), "{kind:?} should count as explicit");
        }
    }

    #[test]
    fn test_logic_and_reg_keywords_alone_are_not_explicit() {
        let diagnostics = check(unit([declaration(3, Some("v"), Some(NodeKind::IntVecTypeLogic))]));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_scalar_declaration_is_ignored() {
        let decl = NodeSpec::new(NodeKind::DataDeclaration, 2).child(
            NodeSpec::new(NodeKind::ListOfVariableDeclAssignments, 2).child(
                NodeSpec::new(NodeKind::VariableDeclAssignment, 2)
                    .child(NodeSpec::ident("flag", 2)),
            ),
        );
        assert!(check(unit([decl])).is_empty());
    }

    #[test]
    fn test_location_is_first_packed_dimension() {
        // Declaration header on line 4, dimension on line 5.
        let decl = NodeSpec::new(NodeKind::DataDeclaration, 4).children([
            NodeSpec::new(NodeKind::PackedDimension, 5),
            NodeSpec::new(NodeKind::PackedDimension, 6),
            NodeSpec::new(NodeKind::ListOfVariableDeclAssignments, 6).child(
                NodeSpec::new(NodeKind::VariableDeclAssignment, 6)
                    .child(NodeSpec::ident("m", 6)),
            ),
        ]);
        let diagnostics = check(unit([decl]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.line, 5);
    }

    #[test]
    fn test_missing_name_uses_placeholder() {
        let diagnostics = check(unit([declaration(7, None, None)]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "variable '<unknown>' declared without explicit type"
        );

        let rule = ImplicitDataType::new().placeholder_name("<anon>");
        let diagnostics = check_tree(&rule, unit([declaration(7, None, None)]));
        assert_eq!(
            diagnostics[0].message,
            "variable '<anon>' declared without explicit type"
        );
    }

    #[test]
    fn test_name_must_be_first_child_of_assignment() {
        // The identifier follows an expression, so it is not the declared name.
        let decl = NodeSpec::new(NodeKind::DataDeclaration, 2).children([
            NodeSpec::new(NodeKind::PackedDimension, 2),
            NodeSpec::new(NodeKind::ListOfVariableDeclAssignments, 2).child(
                NodeSpec::new(NodeKind::VariableDeclAssignment, 2).children([
                    NodeSpec::new(NodeKind::Expression, 2),
                    NodeSpec::ident("rhs", 2),
                ]),
            ),
        ]);
        let diagnostics = check(unit([decl]));
        assert_eq!(
            diagnostics[0].message,
            "variable '<unknown>' declared without explicit type"
        );
    }

    #[test]
    fn test_diagnostics_follow_document_order() {
        let diagnostics = check(unit([
            declaration(3, Some("a"), None),
            declaration(4, Some("b"), Some(NodeKind::DataType)),
            declaration(9, Some("c"), None),
        ]));
        let lines: Vec<u32> = diagnostics.iter().map(|d| d.location.line).collect();
        assert_eq!(lines, vec![3, 9]);
    }

    #[test]
    fn test_custom_severity() {
        let rule = ImplicitDataType::new().severity(Severity::Warning);
        let diagnostics = check_tree(&rule, unit([declaration(3, Some("foo"), None)]));
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(rule.default_severity(), Severity::Warning);
    }
}
