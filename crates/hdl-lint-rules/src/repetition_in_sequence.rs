//! Rule to restrict goto and non-consecutive repetition to boolean operands.
//!
//! `a[->2]` and `a[=2]` are legal only when `a` is a boolean expression.
//! Applied to a sequence, such as `s1[=2]` or `(a ##1 b)[->2]`, they are
//! illegal; only consecutive repetition `[*n]` may follow a sequence.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for repetition-in-sequence.
pub const ID: &str = "REPETITION_IN_SEQUENCE";

/// Rule name for repetition-in-sequence.
pub const NAME: &str = "repetition-in-sequence";

const PLACEHOLDER: &str = "<unknown>";

const SEQUENCE_OPERANDS: &[NodeKind] = &[NodeKind::SequenceExpr, NodeKind::SequenceInstance];

/// Flags `[->n]` and `[=n]` applied to a sequence operand.
#[derive(Debug, Clone)]
pub struct RepetitionInSequence {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for RepetitionInSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl RepetitionInSequence {
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

impl Rule for RepetitionInSequence {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Allows goto and non-consecutive repetition on boolean operands only"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        for seq in
            query::collect_descendants(tree, unit.root(), &[NodeKind::SequenceExpr], Scope::Subtree)
        {
            // The operand of a repetition is the sibling right before it.
            let mut operand: Option<NodeId> = None;
            for child in query::children(tree, seq) {
                let kind = tree.kind(child);
                let restricted = matches!(
                    kind,
                    NodeKind::GotoRepetition | NodeKind::NonConsecutiveRepetition
                );
                let sequence = operand
                    .filter(|&op| restricted && SEQUENCE_OPERANDS.contains(&tree.kind(op)));
                if let Some(op) = sequence {
                    let name = sequence_name(tree, op).unwrap_or(PLACEHOLDER);
                    diagnostics.push(Diagnostic::new(
                        ID,
                        self.severity,
                        tree.location(child),
                        format!("{} applied to sequence '{name}'", operator(kind)),
                    ));
                }
                operand = Some(child);
            }
        }

        Ok(diagnostics)
    }
}

fn operator(kind: NodeKind) -> &'static str {
    if kind == NodeKind::GotoRepetition {
        "goto repetition [->]"
    } else {
        "non-consecutive repetition [=]"
    }
}

/// Name of a sequence instance, or the first signal of a parenthesised
/// sequence.
fn sequence_name(tree: &dyn SyntaxTree, operand: NodeId) -> Option<&str> {
    query::first_identifier(tree, query::children(tree, operand))
        .or_else(|| query::first_identifier(tree, query::descendants(tree, operand)))
}
