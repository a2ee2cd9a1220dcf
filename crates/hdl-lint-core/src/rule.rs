//! Rule trait for defining lint rules.

use crate::tree::NodeId;
use crate::types::{Diagnostic, Severity};
use crate::unit::CompilationUnit;
use thiserror::Error;

/// Failure reported by a rule that could not finish evaluating a unit.
///
/// The dispatcher turns it into one internal-failure diagnostic for the
/// (unit, rule) pair and keeps going.
#[derive(Debug, Error)]
pub enum RuleFault {
    /// The tree did not have a shape the rule relies on.
    #[error("unexpected tree shape at node {node:?}: {message}")]
    UnexpectedShape {
        /// Node where the shape broke.
        node: NodeId,
        /// What was expected.
        message: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// A syntactic lint rule over one compilation unit.
///
/// Rules are stateless between calls, read only the unit they are given,
/// and must be safe to run on several units at once.
///
/// # Example
///
/// ```ignore
/// use hdl_lint_core::{query, CompilationUnit, Diagnostic, NodeKind, Rule, RuleFault, Scope};
///
/// pub struct NoTasks;
///
/// impl Rule for NoTasks {
///     fn id(&self) -> &'static str { "NO_TASKS" }
///     fn name(&self) -> &'static str { "no-tasks" }
///
///     fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
///         let tree = unit.tree;
///         Ok(query::collect_descendants(tree, unit.root(), &[NodeKind::TaskPrototype], Scope::Subtree)
///             .into_iter()
///             .map(|n| Diagnostic::new(self.id(), self.default_severity(), tree.location(n), "task found"))
///             .collect())
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the stable identifier printed in reports
    /// (e.g. `IMPLICIT_DATA_TYPE_IN_DECLARATION`).
    fn id(&self) -> &'static str;

    /// Returns the kebab-case name used in configuration.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for diagnostics from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates one valid unit and returns its diagnostics in document
    /// order.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleFault`] if the rule cannot complete on this unit.
    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
