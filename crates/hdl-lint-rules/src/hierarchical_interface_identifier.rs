//! Rule to forbid hierarchical names where an interface type is expected.
//!
//! An interface port header or a `virtual interface` type names an
//! interface declaration, optionally followed by a modport. A dotted
//! instance path such as `virtual top.u_bus vif;` is not an interface type.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for hierarchical-interface-identifier.
pub const ID: &str = "HIERARCHICAL_INTERFACE_IDENTIFIER";

/// Rule name for hierarchical-interface-identifier.
pub const NAME: &str = "hierarchical-interface-identifier";

const PLACEHOLDER: &str = "<unknown>";

/// Flags interface ports and virtual interfaces typed by a hierarchical path.
#[derive(Debug, Clone)]
pub struct HierarchicalInterfaceIdentifier {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for HierarchicalInterfaceIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchicalInterfaceIdentifier {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for HierarchicalInterfaceIdentifier {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids hierarchical identifiers as interface types"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        let anchors = query::collect_descendants(
            tree,
            unit.root(),
            &[NodeKind::InterfacePortHeader, NodeKind::VirtualInterfaceType],
            Scope::Subtree,
        );

        for anchor in anchors {
            let Some(path) =
                query::find_first(tree, anchor, &[NodeKind::HierarchicalIdentifier], Scope::Children)
            else {
                continue;
            };

            let name = dotted_name(tree, path);
            diagnostics.push(Diagnostic::new(
                ID,
                self.severity,
                tree.location(path),
                format!(
                    "interface '{}' referenced through hierarchical identifier",
                    name.as_deref().unwrap_or(PLACEHOLDER)
                ),
            ));
        }

        Ok(diagnostics)
    }
}

/// Joins the identifiers of a hierarchical path with `.`.
fn dotted_name(tree: &dyn SyntaxTree, path: NodeId) -> Option<String> {
    let parts: Vec<&str> = query::children(tree, path)
        .filter_map(|n| query::symbol_name(tree, n))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}
