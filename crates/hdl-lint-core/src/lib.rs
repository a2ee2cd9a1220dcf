//! # hdl-lint-core
//!
//! Core engine for linting SystemVerilog syntax trees.
//!
//! The tree itself comes from an external parser front-end; this crate
//! defines how rules see it and how they are run:
//!
//! - [`SyntaxTree`] for read-only access to a unit's tree
//! - [`query`] helpers for traversing it
//! - [`Rule`] trait for stateless syntactic checks
//! - [`Dispatcher`] for running rules over compilation units in parallel
//! - [`Reporter`] for rendering [`Diagnostic`]s and the exit status
//!
//! ## Example
//!
//! ```ignore
//! use hdl_lint_core::{Design, Dispatcher, LoadedDesign, Reporter};
//!
//! let design = LoadedDesign::load_files(["build/top.json"]);
//! let dispatcher = Dispatcher::builder()
//!     .rule(MyRule::new())
//!     .fatal_observer(design.fatal_observer())
//!     .build()?;
//!
//! let result = dispatcher.run(&design.compilation_units());
//! let reporter = Reporter::new();
//! reporter.render(&result, &design, &mut std::io::stdout(), &mut std::io::stderr())?;
//! std::process::exit(reporter.exit_code(&result));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod arena;
mod config;
mod dispatcher;
mod dump;
mod fatal;
mod report;
mod rule;
mod tree;
mod types;
mod unit;

/// Traversal helpers for rule implementations.
pub mod query;

pub use arena::{ArenaTree, NodeSpec, TreeError};
pub use config::{Config, ConfigError, DispatcherConfig, RuleConfig};
pub use dispatcher::{Dispatcher, DispatcherBuilder, RegistryError, RuleRegistry};
pub use dump::{DumpError, DumpStatus, FatalDump, LoadedDesign, UnitDump};
pub use fatal::{FatalObserver, RecordedFatals};
pub use query::Scope;
pub use report::{render_line, DiagnosticReport, ReportFormat, Reporter};
pub use rule::{Rule, RuleBox, RuleFault};
pub use tree::{FileId, NodeId, NodeKind, SourceLocation, SyntaxTree};
pub use types::{
    Diagnostic, FatalEvent, LintResult, Severity, SkipNotice, INTERNAL_RULE_FAILURE,
};
pub use unit::{CompilationUnit, Design, UnitStatus};
