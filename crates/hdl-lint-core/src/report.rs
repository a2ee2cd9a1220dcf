//! Rendering of lint results and exit status.
//!
//! Diagnostics go to the primary stream, one per line:
//!
//! ```text
//! Error IMPLICIT_DATA_TYPE_IN_DECLARATION: variable 'foo' declared without explicit type at rtl/top.sv:3
//! ```
//!
//! Skip notices, fatal events and the summary go to the secondary stream so
//! the primary stream stays machine-readable.

use crate::config::Config;
use crate::tree::{FileId, SourceLocation};
use crate::types::{Diagnostic, FatalEvent, LintResult, Severity, SkipNotice};
use crate::unit::Design;

use miette::{GraphicalReportHandler, GraphicalTheme};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One line per diagnostic.
    #[default]
    Text,
    /// A single JSON document with all three channels.
    Json,
    /// Graphical miette reports.
    Fancy,
}

/// Renders results and decides the exit status.
#[derive(Debug, Clone)]
pub struct Reporter {
    format: ReportFormat,
    fail_on: Severity,
    fatal_fails: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            fail_on: Severity::Error,
            fatal_fails: true,
        }
    }
}

impl Reporter {
    /// Creates a text reporter with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reporter using the thresholds from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            format: ReportFormat::Text,
            fail_on: config.fail_threshold(),
            fatal_fails: config.fatal_fails,
        }
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the failure threshold.
    #[must_use]
    pub fn fail_on(mut self, severity: Severity) -> Self {
        self.fail_on = severity;
        self
    }

    /// Sets whether fatal events fail the run.
    #[must_use]
    pub fn fatal_fails(mut self, fails: bool) -> Self {
        self.fatal_fails = fails;
        self
    }

    /// Writes `result` to `out` (diagnostics) and `err` (notices, summary).
    ///
    /// # Errors
    ///
    /// Returns an error if writing to either stream fails.
    pub fn render(
        &self,
        result: &LintResult,
        design: &dyn Design,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => {
                for d in &result.diagnostics {
                    writeln!(out, "{}", render_line(d, design))?;
                }
                write_notices(result, design, err)?;
                write_summary(result, err)
            }
            ReportFormat::Json => {
                let report = JsonReport::new(result, design);
                serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::from)?;
                writeln!(out)
            }
            ReportFormat::Fancy => {
                let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
                for d in &result.diagnostics {
                    let report = DiagnosticReport::new(d, design);
                    let mut rendered = String::new();
                    handler
                        .render_report(&mut rendered, &report)
                        .map_err(io::Error::other)?;
                    write!(out, "{rendered}")?;
                }
                write_notices(result, design, err)?;
                write_summary(result, err)
            }
        }
    }

    /// Returns the process exit status for `result`: 1 if a diagnostic
    /// reaches the threshold or a fatal event counts as failure, else 0.
    #[must_use]
    pub fn exit_code(&self, result: &LintResult) -> i32 {
        let failed = result.has_violations_at(self.fail_on)
            || (self.fatal_fails && result.has_fatal());
        i32::from(failed)
    }
}

/// Formats one diagnostic as `<Severity> <RULE_ID>: <message> at <path>:<line>`.
#[must_use]
pub fn render_line(diagnostic: &Diagnostic, design: &dyn Design) -> String {
    format!(
        "{} {}: {} at {}:{}",
        diagnostic.severity.label(),
        diagnostic.rule_id,
        diagnostic.message,
        resolve(design, diagnostic.location.file),
        diagnostic.location.line
    )
}

fn resolve(design: &dyn Design, file: FileId) -> Cow<'_, str> {
    design
        .resolve_path(file)
        .map_or_else(|| Cow::Owned(file.to_string()), Cow::Borrowed)
}

fn write_notices(result: &LintResult, design: &dyn Design, err: &mut dyn Write) -> io::Result<()> {
    for skip in &result.skipped {
        writeln!(
            err,
            "Skipped {} ({}): {}",
            skip.unit,
            resolve(design, skip.file),
            skip.reason
        )?;
    }
    for event in &result.fatal {
        match event.location {
            Some(loc) => writeln!(
                err,
                "Fatal {}: {} at {}:{}",
                event.unit,
                event.message,
                resolve(design, loc.file),
                loc.line
            )?,
            None => writeln!(err, "Fatal {}: {}", event.unit, event.message)?,
        }
    }
    Ok(())
}

fn write_summary(result: &LintResult, err: &mut dyn Write) -> io::Result<()> {
    let (errors, warnings, infos) = result.count_by_severity();
    writeln!(
        err,
        "Found {} error(s), {} warning(s), {} info(s) in {} unit(s)",
        errors, warnings, infos, result.units_checked
    )
}

/// Diagnostic with its file resolved, for rich display.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DiagnosticReport {
    rule_id: String,
    severity: Severity,
    message: String,
    at: String,
}

impl DiagnosticReport {
    /// Resolves `diagnostic`'s location against `design`.
    #[must_use]
    pub fn new(diagnostic: &Diagnostic, design: &dyn Design) -> Self {
        Self {
            rule_id: diagnostic.rule_id.clone(),
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
            at: format!(
                "{}:{}",
                resolve(design, diagnostic.location.file),
                diagnostic.location.line
            ),
        }
    }
}

impl miette::Diagnostic for DiagnosticReport {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(&self.rule_id))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("at {}", self.at)))
    }
}

#[derive(Serialize)]
struct JsonLocation<'a> {
    path: Cow<'a, str>,
    line: u32,
}

impl<'a> JsonLocation<'a> {
    fn new(location: SourceLocation, design: &'a dyn Design) -> Self {
        Self {
            path: resolve(design, location.file),
            line: location.line,
        }
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    rule_id: &'a str,
    severity: Severity,
    message: &'a str,
    location: JsonLocation<'a>,
}

#[derive(Serialize)]
struct JsonSkip<'a> {
    unit: &'a str,
    path: Cow<'a, str>,
    reason: &'a str,
}

#[derive(Serialize)]
struct JsonFatal<'a> {
    unit: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation<'a>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    skipped: Vec<JsonSkip<'a>>,
    fatal: Vec<JsonFatal<'a>>,
    units_checked: usize,
}

impl<'a> JsonReport<'a> {
    fn new(result: &'a LintResult, design: &'a dyn Design) -> Self {
        Self {
            diagnostics: result
                .diagnostics
                .iter()
                .map(|d| JsonDiagnostic {
                    rule_id: &d.rule_id,
                    severity: d.severity,
                    message: &d.message,
                    location: JsonLocation::new(d.location, design),
                })
                .collect(),
            skipped: result
                .skipped
                .iter()
                .map(|s: &'a SkipNotice| JsonSkip {
                    unit: &s.unit,
                    path: resolve(design, s.file),
                    reason: &s.reason,
                })
                .collect(),
            fatal: result
                .fatal
                .iter()
                .map(|f: &'a FatalEvent| JsonFatal {
                    unit: &f.unit,
                    message: &f.message,
                    location: f.location.map(|l| JsonLocation::new(l, design)),
                })
                .collect(),
            units_checked: result.units_checked,
        }
    }
}
