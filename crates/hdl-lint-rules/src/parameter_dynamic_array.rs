//! Rule to forbid dynamic-array parameters.
//!
//! `parameter int P [] = '{1, 2};` has no fixed size at elaboration time
//! and is rejected or mis-handled by most synthesis tools.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{CompilationUnit, Diagnostic, NodeKind, Rule, RuleFault, Severity};

/// Rule id for parameter-dynamic-array.
pub const ID: &str = "PARAMETER_DYNAMIC_ARRAY";

/// Rule name for parameter-dynamic-array.
pub const NAME: &str = "parameter-dynamic-array";

const PLACEHOLDER: &str = "<unknown>";

/// Flags `parameter`/`localparam` assignments with an unsized dimension.
#[derive(Debug, Clone)]
pub struct ParameterDynamicArray {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ParameterDynamicArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterDynamicArray {
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

impl Rule for ParameterDynamicArray {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids parameters declared as dynamic arrays"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        let decls = query::collect_descendants(
            tree,
            unit.root(),
            &[
                NodeKind::ParameterDeclaration,
                NodeKind::LocalParameterDeclaration,
            ],
            Scope::Subtree,
        );

        for decl in decls {
            for assign in
                query::collect_descendants(tree, decl, &[NodeKind::ParamAssignment], Scope::Subtree)
            {
                let Some(dim) =
                    query::find_first(tree, assign, &[NodeKind::UnsizedDimension], Scope::Subtree)
                else {
                    continue;
                };
                let name = query::first_identifier(tree, query::children(tree, assign))
                    .unwrap_or(PLACEHOLDER);
                diagnostics.push(Diagnostic::new(
                    ID,
                    self.severity,
                    query::location(tree, dim),
                    format!("parameter '{name}' declared as dynamic array"),
                ));
            }
        }

        Ok(diagnostics)
    }
}
