//! Rule to require a return data type on function prototypes.
//!
//! Covers prototypes declared in class methods (`pure virtual function`,
//! `extern function`) and `extern function` declarations in interfaces.
//!
//! # Configuration
//!
//! - `exempt_constructors`: Do not flag prototypes named `new`
//!   (default: false)

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};
use std::collections::HashSet;

/// Rule id for prototype-return-data-type.
pub const ID: &str = "PROTOTYPE_RETURN_DATA_TYPE";

/// Rule name for prototype-return-data-type.
pub const NAME: &str = "prototype-return-data-type";

const PLACEHOLDER: &str = "<unknown>";

/// Flags function prototypes whose return type is implicit.
#[derive(Debug, Clone)]
pub struct PrototypeReturnDataType {
    /// Skip prototypes named `new`.
    pub exempt_constructors: bool,
    /// Custom severity.
    pub severity: Severity,
}

impl Default for PrototypeReturnDataType {
    fn default() -> Self {
        Self::new()
    }
}

impl PrototypeReturnDataType {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exempt_constructors: false,
            severity: Severity::Error,
        }
    }

    /// Sets whether constructor prototypes are exempt.
    #[must_use]
    pub fn exempt_constructors(mut self, exempt: bool) -> Self {
        self.exempt_constructors = exempt;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn check_prototype(&self, tree: &dyn SyntaxTree, proto: NodeId) -> Option<Diagnostic> {
        let type_node = query::find_first(
            tree,
            proto,
            &[NodeKind::FunctionDataTypeOrImplicit],
            Scope::Children,
        )?;
        if query::contains_any(tree, type_node, &[NodeKind::FunctionDataType], Scope::Children) {
            return None;
        }

        let name = query::first_identifier(tree, query::following_siblings(tree, type_node));
        if self.exempt_constructors && name == Some("new") {
            return None;
        }

        Some(Diagnostic::new(
            ID,
            self.severity,
            tree.location(type_node),
            format!(
                "Function prototype '{}' missing return data type",
                name.unwrap_or(PLACEHOLDER)
            ),
        ))
    }
}

impl Rule for PrototypeReturnDataType {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires an explicit return data type on class and interface function prototypes"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut seen = HashSet::new();

        // Class prototypes first, then interface externs.
        let class_protos = query::collect_descendants(
            tree,
            unit.root(),
            &[NodeKind::ClassDeclaration],
            Scope::Subtree,
        )
        .into_iter()
        .flat_map(|class| {
            query::collect_descendants(tree, class, &[NodeKind::ClassMethod], Scope::Subtree)
        })
        .flat_map(|method| {
            query::collect_descendants(tree, method, &[NodeKind::FunctionPrototype], Scope::Children)
        });

        let interface_protos = query::collect_descendants(
            tree,
            unit.root(),
            &[NodeKind::InterfaceDeclaration],
            Scope::Subtree,
        )
        .into_iter()
        .flat_map(|iface| {
            query::collect_descendants(tree, iface, &[NodeKind::NonPortInterfaceItem], Scope::Subtree)
        })
        .flat_map(|item| {
            query::collect_descendants(tree, item, &[NodeKind::ExternTfDeclaration], Scope::Subtree)
        })
        .flat_map(|ext| {
            query::collect_descendants(tree, ext, &[NodeKind::FunctionPrototype], Scope::Children)
        });

        // Nested classes and interfaces are reached from every enclosing
        // declaration; each prototype is reported once.
        Ok(class_protos
            .chain(interface_protos)
            .filter(|proto| seen.insert(*proto))
            .filter_map(|proto| self.check_prototype(tree, proto))
            .collect())
    }
}
