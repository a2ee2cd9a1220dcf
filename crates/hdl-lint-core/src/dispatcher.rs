//! Rule registry and dispatcher orchestrating lint execution.

use crate::config::Config;
use crate::fatal::FatalObserver;
use crate::rule::{Rule, RuleBox, RuleFault};
use crate::types::{Diagnostic, LintResult, Severity, SkipNotice, INTERNAL_RULE_FAILURE};
use crate::unit::{CompilationUnit, UnitStatus};

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while assembling the rule set.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two rules share an id.
    #[error("rule id `{id}` is already registered")]
    DuplicateId {
        /// The colliding id.
        id: String,
    },

    /// A rule claimed the id reserved for internal failures.
    #[error("rule id `{id}` is reserved")]
    ReservedId {
        /// The reserved id.
        id: String,
    },
}

/// Ordered set of rules, unique by id.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<RuleBox>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule after the ones already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is taken or reserved.
    pub fn register(&mut self, rule: RuleBox) -> Result<(), RegistryError> {
        let id = rule.id();
        if id == INTERNAL_RULE_FAILURE {
            return Err(RegistryError::ReservedId { id: id.to_string() });
        }
        if self.rules.iter().any(|r| r.id() == id) {
            return Err(RegistryError::DuplicateId { id: id.to_string() });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Returns the rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.id()))
            .finish()
    }
}

/// Builder for configuring a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    rules: Vec<RuleBox>,
    registry: Option<RuleRegistry>,
    config: Option<Config>,
    observer: Option<Box<dyn FatalObserver>>,
    parallelism: Option<usize>,
}

impl DispatcherBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Starts from an existing registry; rules added with
    /// [`DispatcherBuilder::rule`] are registered after it.
    #[must_use]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the fatal condition observer.
    #[must_use]
    pub fn fatal_observer<O: FatalObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Sets the worker count; overrides the configuration. `1` runs on the
    /// caller's thread.
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules share an id or a rule uses the reserved id.
    pub fn build(self) -> Result<Dispatcher, RegistryError> {
        let mut registry = self.registry.unwrap_or_default();
        for rule in self.rules {
            registry.register(rule)?;
        }

        let config = self.config.unwrap_or_default();
        let parallelism = self
            .parallelism
            .or(config.dispatcher.parallelism)
            .unwrap_or_else(default_parallelism)
            .max(1);

        Ok(Dispatcher {
            registry,
            config,
            observer: self.observer,
            parallelism,
        })
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Runs every enabled rule against every valid unit.
///
/// Use [`Dispatcher::builder()`] to construct an instance.
pub struct Dispatcher {
    registry: RuleRegistry,
    config: Config,
    observer: Option<Box<dyn FatalObserver>>,
    parallelism: usize,
}

/// Diagnostics of one (unit, rule) job, tagged for reordering.
struct Batch {
    unit: usize,
    rule: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Dispatcher {
    /// Creates a new builder for configuring a dispatcher.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the worker count.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Lints `units` and returns diagnostics in (unit, registration,
    /// emission) order, independent of how jobs were scheduled.
    ///
    /// Invalid units are skipped with one notice each. Rule faults and
    /// panics become internal-failure diagnostics; nothing aborts the run.
    #[must_use]
    pub fn run(&self, units: &[CompilationUnit<'_>]) -> LintResult {
        let mut result = LintResult::new();

        let enabled: Vec<usize> = self
            .registry
            .rules()
            .iter()
            .enumerate()
            .filter_map(|(idx, rule)| {
                if self.config.is_rule_enabled(rule.name(), rule.id()) {
                    Some(idx)
                } else {
                    debug!("Skipping disabled rule: {}", rule.id());
                    None
                }
            })
            .collect();

        let mut valid = Vec::new();
        for (idx, unit) in units.iter().enumerate() {
            match unit.status {
                UnitStatus::Valid => valid.push(idx),
                UnitStatus::Invalid { reason } => {
                    warn!("Skipping invalid unit {}: {}", unit.name, reason);
                    result.skipped.push(SkipNotice {
                        unit: unit.name.to_string(),
                        file: unit.file,
                        reason: reason.clone(),
                    });
                }
            }
        }

        let jobs: Vec<(usize, usize)> = valid
            .iter()
            .flat_map(|&u| enabled.iter().map(move |&r| (u, r)))
            .collect();

        info!(
            "Linting {} units with {} rules ({} jobs, {} workers)",
            valid.len(),
            enabled.len(),
            jobs.len(),
            self.parallelism
        );

        let mut batches = self.execute(units, &jobs);
        batches.sort_by_key(|b| (b.unit, b.rule));
        result
            .diagnostics
            .extend(batches.into_iter().flat_map(|b| b.diagnostics));

        if let Some(observer) = &self.observer {
            for &idx in &valid {
                let events = observer.observe(&units[idx]);
                if !events.is_empty() {
                    warn!("{} fatal events in unit {}", events.len(), units[idx].name);
                }
                result.fatal.extend(events);
            }
        }

        result.units_checked = valid.len();
        result.rules_executed = enabled.len();

        info!(
            "Lint complete: {} diagnostics in {} units ({} skipped, {} fatal)",
            result.diagnostics.len(),
            result.units_checked,
            result.skipped.len(),
            result.fatal.len()
        );

        result
    }

    fn execute(&self, units: &[CompilationUnit<'_>], jobs: &[(usize, usize)]) -> Vec<Batch> {
        let sink = Mutex::new(Vec::with_capacity(jobs.len()));
        let push = |batch: Batch| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(batch);
        };

        if self.parallelism == 1 {
            for &(u, r) in jobs {
                push(self.run_job(units, u, r));
            }
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.parallelism)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    jobs.par_iter()
                        .for_each(|&(u, r)| push(self.run_job(units, u, r)));
                }),
                Err(e) => {
                    warn!("Failed to build worker pool, running sequentially: {}", e);
                    for &(u, r) in jobs {
                        push(self.run_job(units, u, r));
                    }
                }
            }
        }

        sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_job(&self, units: &[CompilationUnit<'_>], unit_idx: usize, rule_idx: usize) -> Batch {
        let unit = &units[unit_idx];
        let rule = &self.registry.rules()[rule_idx];
        debug!("Running {} on {}", rule.id(), unit.name);

        let outcome = catch_unwind(AssertUnwindSafe(|| rule.evaluate(unit)));
        let diagnostics = match outcome {
            Ok(Ok(diagnostics)) => self.apply_severity_override(rule.as_ref(), diagnostics),
            Ok(Err(fault)) => vec![internal_failure(rule.as_ref(), unit, &fault.to_string())],
            Err(payload) => {
                let fault = RuleFault::Other(panic_message(payload.as_ref()));
                vec![internal_failure(rule.as_ref(), unit, &fault.to_string())]
            }
        };

        Batch {
            unit: unit_idx,
            rule: rule_idx,
            diagnostics,
        }
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule: &dyn Rule,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        if let Some(severity) = self.config.rule_severity(rule.name(), rule.id()) {
            for d in &mut diagnostics {
                d.severity = severity;
            }
        }
        diagnostics
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("parallelism", &self.parallelism)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

fn internal_failure(rule: &dyn Rule, unit: &CompilationUnit<'_>, reason: &str) -> Diagnostic {
    warn!("Rule {} failed on {}: {}", rule.id(), unit.name, reason);
    Diagnostic::new(
        INTERNAL_RULE_FAILURE,
        Severity::Error,
        unit.root_location(),
        format!("rule {} failed: {}", rule.id(), reason),
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}
