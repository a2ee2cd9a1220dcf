//! Rule to forbid `automatic` lifetime on class properties.
//!
//! Class properties always live as long as their object; an `automatic`
//! qualifier on one is illegal.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for class-variable-lifetime.
pub const ID: &str = "CLASS_VARIABLE_LIFETIME";

/// Rule name for class-variable-lifetime.
pub const NAME: &str = "class-variable-lifetime";

const PLACEHOLDER: &str = "<unknown>";

/// Flags class properties declared with `automatic` lifetime.
#[derive(Debug, Clone)]
pub struct ClassVariableLifetime {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for ClassVariableLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassVariableLifetime {
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

impl Rule for ClassVariableLifetime {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids automatic lifetime on class variables"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        for prop in
            query::collect_descendants(tree, unit.root(), &[NodeKind::ClassProperty], Scope::Subtree)
        {
            let Some(decl) =
                query::find_first(tree, prop, &[NodeKind::DataDeclaration], Scope::Children)
            else {
                continue;
            };
            let Some(lifetime) =
                query::find_first(tree, decl, &[NodeKind::LifetimeAutomatic], Scope::Subtree)
            else {
                continue;
            };

            let name = declared_name(tree, decl).unwrap_or(PLACEHOLDER);
            diagnostics.push(Diagnostic::new(
                ID,
                self.severity,
                tree.location(lifetime),
                format!("class variable '{name}' declared with automatic lifetime"),
            ));
        }

        Ok(diagnostics)
    }
}

fn declared_name(tree: &dyn SyntaxTree, decl: NodeId) -> Option<&str> {
    let assign = query::find_first(tree, decl, &[NodeKind::VariableDeclAssignment], Scope::Subtree)?;
    query::first_identifier(tree, query::children(tree, assign))
}
