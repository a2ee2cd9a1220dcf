//! Rule to keep coverpoint expressions free of side effects.
//!
//! A coverpoint expression is evaluated at every sampling event. An
//! increment or an embedded assignment in it, such as `coverpoint cnt++;`,
//! changes design state each time coverage is sampled.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for covergroup-expression.
pub const ID: &str = "COVERGROUP_EXPRESSION";

/// Rule name for covergroup-expression.
pub const NAME: &str = "covergroup-expression";

const PLACEHOLDER: &str = "<unknown>";

const SIDE_EFFECTS: &[NodeKind] = &[NodeKind::IncOrDecExpression, NodeKind::OperatorAssignment];

/// Flags coverpoints whose expression modifies state.
#[derive(Debug, Clone)]
pub struct CovergroupExpression {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for CovergroupExpression {
    fn default() -> Self {
        Self::new()
    }
}

impl CovergroupExpression {
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

/// Returns true if the coverpoint expression `expr` has no side effects.
#[must_use]
pub fn is_allowed_expression(tree: &dyn SyntaxTree, expr: NodeId) -> bool {
    !SIDE_EFFECTS.contains(&tree.kind(expr))
        && !query::contains_any(tree, expr, SIDE_EFFECTS, Scope::Subtree)
}

impl Rule for CovergroupExpression {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids side effects in coverpoint expressions"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        for group in query::collect_descendants(
            tree,
            unit.root(),
            &[NodeKind::CovergroupDeclaration],
            Scope::Subtree,
        ) {
            for point in
                query::collect_descendants(tree, group, &[NodeKind::CoverPoint], Scope::Subtree)
            {
                let Some(expr) =
                    query::find_first(tree, point, &[NodeKind::Expression], Scope::Children)
                else {
                    continue;
                };
                if is_allowed_expression(tree, expr) {
                    continue;
                }

                let offending = query::find_first(tree, expr, SIDE_EFFECTS, Scope::Subtree)
                    .unwrap_or(expr);
                let name = query::first_identifier(tree, query::children(tree, point))
                    .or_else(|| query::first_identifier(tree, query::descendants(tree, expr)))
                    .unwrap_or(PLACEHOLDER);
                diagnostics.push(Diagnostic::new(
                    ID,
                    self.severity,
                    tree.location(offending),
                    format!("coverpoint '{name}' expression has side effects"),
                ));
            }
        }

        Ok(diagnostics)
    }
}
