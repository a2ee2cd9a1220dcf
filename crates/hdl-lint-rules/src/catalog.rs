//! The built-in rule catalogue.

use crate::{
    implicit_data_type, prototype_return_data_type, ClassVariableLifetime, CovergroupExpression,
    DpiDeclarationString, HierarchicalInterfaceIdentifier, ImplicitDataType,
    ParameterDynamicArray, PrototypeReturnDataType, RepetitionInSequence,
};
use hdl_lint_core::{Config, RuleBox};
use thiserror::Error;
use tracing::debug;

/// A requested rule is not in the catalogue.
#[derive(Debug, Error)]
#[error("unknown rule `{name}`. Run `hdl-lint list-rules` to see available rules")]
pub struct UnknownRule {
    /// The name that did not match.
    pub name: String,
}

/// Returns all built-in rules with default settings, in dispatch order.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(RepetitionInSequence::new()),
        Box::new(PrototypeReturnDataType::new()),
        Box::new(ParameterDynamicArray::new()),
        Box::new(ImplicitDataType::new()),
        Box::new(HierarchicalInterfaceIdentifier::new()),
        Box::new(DpiDeclarationString::new()),
        Box::new(ClassVariableLifetime::new()),
        Box::new(CovergroupExpression::new()),
    ]
}

/// Returns all built-in rules with options taken from `config`.
///
/// Enablement and severity overrides are left to the dispatcher.
#[must_use]
pub fn rules_from_config(config: &Config) -> Vec<RuleBox> {
    let mut implicit = ImplicitDataType::new();
    if let Some(rc) = config.rule_config(implicit_data_type::NAME, implicit_data_type::ID) {
        implicit = implicit.placeholder_name(
            rc.get_str("placeholder_name", implicit_data_type::DEFAULT_PLACEHOLDER),
        );
    }

    let mut prototype = PrototypeReturnDataType::new();
    if let Some(rc) = config.rule_config(
        prototype_return_data_type::NAME,
        prototype_return_data_type::ID,
    ) {
        prototype = prototype.exempt_constructors(rc.get_bool("exempt_constructors", false));
    }

    debug!(
        "Configured rules: placeholder_name={:?}, exempt_constructors={}",
        implicit.placeholder_name, prototype.exempt_constructors
    );

    vec![
        Box::new(RepetitionInSequence::new()),
        Box::new(prototype),
        Box::new(ParameterDynamicArray::new()),
        Box::new(implicit),
        Box::new(HierarchicalInterfaceIdentifier::new()),
        Box::new(DpiDeclarationString::new()),
        Box::new(ClassVariableLifetime::new()),
        Box::new(CovergroupExpression::new()),
    ]
}

/// Keeps the rules named in `names` (by name or id), preserving catalogue
/// order.
///
/// # Errors
///
/// Returns an error for the first name that matches no rule.
pub fn select_rules<S: AsRef<str>>(
    rules: Vec<RuleBox>,
    names: &[S],
) -> Result<Vec<RuleBox>, UnknownRule> {
    let matches = |rule: &RuleBox, name: &str| rule.name() == name || rule.id() == name;

    if let Some(unknown) = names
        .iter()
        .map(|n| -> &str { n.as_ref() })
        .find(|name| !rules.iter().any(|r| matches(r, *name)))
    {
        return Err(UnknownRule {
            name: unknown.to_string(),
        });
    }

    Ok(rules
        .into_iter()
        .filter(|r| names.iter().any(|n| matches(r, n.as_ref())))
        .collect())
}
