//! Rule to require the `"DPI-C"` specification string.
//!
//! `import "DPI" function ...` is the deprecated SystemVerilog 3.1a form,
//! whose argument passing differs from `"DPI-C"`.

use hdl_lint_core::query::{self, Scope};
use hdl_lint_core::{
    CompilationUnit, Diagnostic, NodeId, NodeKind, Rule, RuleFault, Severity, SyntaxTree,
};

/// Rule id for dpi-declaration-string.
pub const ID: &str = "DPI_DECLARATION_STRING";

/// Rule name for dpi-declaration-string.
pub const NAME: &str = "dpi-declaration-string";

const PLACEHOLDER: &str = "<unknown>";

/// Flags DPI imports and exports declared with `"DPI"` instead of `"DPI-C"`.
#[derive(Debug, Clone)]
pub struct DpiDeclarationString {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for DpiDeclarationString {
    fn default() -> Self {
        Self::new()
    }
}

impl DpiDeclarationString {
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

impl Rule for DpiDeclarationString {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires \"DPI-C\" instead of the deprecated \"DPI\" string"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn evaluate(&self, unit: &CompilationUnit<'_>) -> Result<Vec<Diagnostic>, RuleFault> {
        let tree = unit.tree;
        let mut diagnostics = Vec::new();

        for decl in
            query::collect_descendants(tree, unit.root(), &[NodeKind::DpiImportExport], Scope::Subtree)
        {
            let Some(spec) =
                query::find_first(tree, decl, &[NodeKind::DpiSpecStringDpi], Scope::Children)
            else {
                continue;
            };

            let name = subroutine_name(tree, decl).unwrap_or(PLACEHOLDER);
            diagnostics.push(Diagnostic::new(
                ID,
                self.severity,
                tree.location(spec),
                format!("DPI declaration '{name}' uses deprecated \"DPI\"; use \"DPI-C\""),
            ));
        }

        Ok(diagnostics)
    }
}

/// SystemVerilog name of the subroutine: from the prototype of an import,
/// else the identifier of an export or a C alias.
fn subroutine_name(tree: &dyn SyntaxTree, decl: NodeId) -> Option<&str> {
    query::find_first(
        tree,
        decl,
        &[NodeKind::FunctionPrototype, NodeKind::TaskPrototype],
        Scope::Children,
    )
    .and_then(|proto| query::first_identifier(tree, query::children(tree, proto)))
    .or_else(|| query::first_identifier(tree, query::children(tree, decl)))
}
