//! Core types for diagnostics and run results.

use crate::tree::SourceLocation;
use serde::{Deserialize, Serialize};

/// Rule id reserved for diagnostics reporting a rule that failed internally.
pub const INTERNAL_RULE_FAILURE: &str = "INTERNAL_RULE_FAILURE";

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run by default.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Capitalised label used in the one-line rendering (`Error`, `Warning`, `Info`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`. Valid values: error, warning, info"
            )),
        }
    }
}

/// A rule violation found in a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Id of the rule that produced this diagnostic.
    pub rule_id: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Location of the offending construct.
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        location: SourceLocation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
        }
    }

    /// Returns true if this diagnostic reports an internal rule failure.
    #[must_use]
    pub fn is_internal_failure(&self) -> bool {
        self.rule_id == INTERNAL_RULE_FAILURE
    }
}

/// Notice that a unit was not linted because its tree is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipNotice {
    /// Name of the skipped unit.
    pub unit: String,
    /// Primary file of the skipped unit.
    pub file: crate::tree::FileId,
    /// Reason reported by the provider.
    pub reason: String,
}

/// Fatal condition raised by elaboration, outside the syntactic rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalEvent {
    /// Unit whose design context produced the event.
    pub unit: String,
    /// Message from the observer.
    pub message: String,
    /// Location, when the observer can point at one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl FatalEvent {
    /// Creates a new fatal event.
    #[must_use]
    pub fn new(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// Result of a dispatcher run.
///
/// Syntactic diagnostics, skip notices and fatal events are kept in
/// separate fields and never mixed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LintResult {
    /// Diagnostics in (unit, rule registration, emission) order.
    pub diagnostics: Vec<Diagnostic>,
    /// One notice per unit skipped because its tree is invalid.
    pub skipped: Vec<SkipNotice>,
    /// Events from the fatal condition observer.
    pub fatal: Vec<FatalEvent>,
    /// Number of units the rules ran on.
    pub units_checked: usize,
    /// Number of rules scheduled per unit.
    pub rules_executed: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any error diagnostics.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any diagnostics meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= severity)
    }

    /// Returns true if the fatal observer reported anything.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        !self.fatal.is_empty()
    }

    /// Returns diagnostics produced by the given rule.
    #[must_use]
    pub fn by_rule(&self, rule_id: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.rule_id == rule_id)
            .collect()
    }

    /// Counts diagnostics by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.diagnostics
            .iter()
            .fold((0, 0, 0), |(e, w, i), d| match d.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Appends another result after this one.
    pub fn extend(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
        self.skipped.extend(other.skipped);
        self.fatal.extend(other.fatal);
        self.units_checked += other.units_checked;
        self.rules_executed = self.rules_executed.max(other.rules_executed);
    }
}
