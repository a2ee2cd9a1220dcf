//! Boundary to the elaboration-time fatal condition listener.
//!
//! Fatal conditions come from outside the syntactic rules, so they are
//! collected through their own trait and never show up as diagnostics.

use crate::tree::FileId;
use crate::types::FatalEvent;
use crate::unit::CompilationUnit;
use std::collections::HashMap;

/// Observer invoked once per valid unit after every rule has finished on it.
pub trait FatalObserver: Send + Sync {
    /// Returns the fatal events raised for `unit`.
    fn observe(&self, unit: &CompilationUnit<'_>) -> Vec<FatalEvent>;
}

/// Observer replaying events recorded ahead of time.
///
/// Used when the front-end has already elaborated the design and exported
/// its fatal events alongside the tree. Events are keyed by the unit's
/// primary file and name; unit names alone repeat across files.
#[derive(Debug, Default, Clone)]
pub struct RecordedFatals {
    events: HashMap<FileId, HashMap<String, Vec<FatalEvent>>>,
}

impl RecordedFatals {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event for the unit named `event.unit` whose primary file
    /// is `file`.
    pub fn record(&mut self, file: FileId, event: FatalEvent) {
        self.events
            .entry(file)
            .or_default()
            .entry(event.unit.clone())
            .or_default()
            .push(event);
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FatalObserver for RecordedFatals {
    fn observe(&self, unit: &CompilationUnit<'_>) -> Vec<FatalEvent> {
        self.events
            .get(&unit.file)
            .and_then(|by_name| by_name.get(unit.name))
            .cloned()
            .unwrap_or_default()
    }
}
