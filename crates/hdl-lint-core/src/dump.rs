//! Loading of JSON tree dumps exported by a parser front-end.
//!
//! One dump holds one compilation unit:
//!
//! ```json
//! {
//!   "unit": "top",
//!   "path": "rtl/top.sv",
//!   "status": "valid",
//!   "fatal": [{ "message": "cannot elaborate", "line": 12 }],
//!   "root": { "kind": "source_text", "line": 1, "children": [] }
//! }
//! ```

use crate::arena::{ArenaTree, NodeSpec, TreeError};
use crate::fatal::RecordedFatals;
use crate::tree::{FileId, NodeKind, SourceLocation};
use crate::types::FatalEvent;
use crate::unit::{CompilationUnit, Design, UnitStatus};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading dumps.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump file could not be read.
    #[error("Failed to read dump {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The dump is not valid JSON or does not match the format.
    #[error("Invalid dump {path}: {source}")]
    Json {
        /// Offending dump.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The tree inside the dump is malformed.
    #[error("Invalid tree in {path}: {source}")]
    Tree {
        /// Offending dump.
        path: PathBuf,
        /// Underlying tree error.
        source: TreeError,
    },

    /// A unit with the same name and primary file is already loaded.
    #[error("Duplicate unit `{unit}` in {path}")]
    DuplicateUnit {
        /// Primary file of the unit.
        path: PathBuf,
        /// Unit name.
        unit: String,
    },
}

/// Validity as recorded by the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpStatus {
    /// The tree is complete.
    #[default]
    Valid,
    /// The tree is partial; carries the front-end's reason.
    Invalid(String),
}

/// A fatal event recorded during elaboration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalDump {
    /// Message from the elaborator.
    pub message: String,
    /// Line, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// File, if different from the unit's.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Serialised compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDump {
    /// Unit name.
    pub unit: String,
    /// Path of the unit's primary file.
    pub path: String,
    /// Tree validity.
    #[serde(default)]
    pub status: DumpStatus,
    /// Recorded fatal events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fatal: Vec<FatalDump>,
    /// Root of the syntax tree.
    pub root: NodeSpec,
}

impl UnitDump {
    /// Parses a dump of any nesting depth.
    ///
    /// Each tree level costs two JSON levels, so the parser's default
    /// recursion limit would reject ordinary expression chains.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid dump.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let dump = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(dump)
    }
}

/// Paths of every file seen in a design, indexed by [`FileId`].
#[derive(Debug, Default)]
struct FileTable {
    paths: Vec<String>,
    ids: HashMap<String, FileId>,
}

impl FileTable {
    fn intern(&mut self, path: &str) -> FileId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        // File tables never approach u32::MAX entries.
        let id = FileId::new(u32::try_from(self.paths.len()).unwrap_or(u32::MAX));
        self.paths.push(path.to_string());
        self.ids.insert(path.to_string(), id);
        id
    }

    fn get(&self, file: FileId) -> Option<&str> {
        self.paths.get(file.index() as usize).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.paths.len()
    }

    /// Forgets every path interned since the table had `len` entries.
    fn truncate(&mut self, len: usize) {
        for path in self.paths.drain(len..) {
            self.ids.remove(&path);
        }
    }
}

#[derive(Debug)]
struct LoadedUnit {
    name: String,
    file: FileId,
    tree: ArenaTree,
    status: UnitStatus,
}

/// A [`Design`] assembled from tree dumps.
#[derive(Debug, Default)]
pub struct LoadedDesign {
    files: FileTable,
    units: Vec<LoadedUnit>,
    fatals: RecordedFatals,
}

impl LoadedDesign {
    /// Creates an empty design.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every dump in `paths`, in order.
    ///
    /// A dump that fails to load becomes an invalid unit named after the
    /// file, so it is skipped with a notice while the others are checked.
    #[must_use]
    pub fn load_files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut design = Self::new();
        for path in paths {
            let path = path.as_ref();
            if let Err(e) = design.load_file(path) {
                warn!("{}", e);
                design.add_unloadable(path, &e);
            }
        }
        design
    }

    /// Loads one dump file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid dump.
    pub fn load_file(&mut self, path: &Path) -> Result<(), DumpError> {
        debug!("Loading dump: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| DumpError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let dump = UnitDump::from_json(&content).map_err(|e| DumpError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.add_dump(dump)
    }

    /// Adds an already parsed dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree has a node on line 0 or is too large, or
    /// if a unit with the same name and path is already loaded. The design
    /// is left unchanged on error.
    pub fn add_dump(&mut self, dump: UnitDump) -> Result<(), DumpError> {
        if self
            .units
            .iter()
            .any(|u| u.name == dump.unit && self.files.get(u.file) == Some(dump.path.as_str()))
        {
            return Err(DumpError::DuplicateUnit {
                path: PathBuf::from(&dump.path),
                unit: dump.unit,
            });
        }

        let mark = self.files.len();
        let file = self.files.intern(&dump.path);
        let files = &mut self.files;
        let tree = match ArenaTree::from_spec_with(&dump.root, file, |p| files.intern(p)) {
            Ok(tree) => tree,
            Err(source) => {
                self.files.truncate(mark);
                return Err(DumpError::Tree {
                    path: PathBuf::from(&dump.path),
                    source,
                });
            }
        };

        for fatal in dump.fatal {
            let mut event = FatalEvent::new(dump.unit.clone(), fatal.message);
            if let Some(line) = fatal.line.filter(|&l| l > 0) {
                let fatal_file = fatal
                    .file
                    .as_deref()
                    .map_or(file, |p| self.files.intern(p));
                event = event.at(SourceLocation::new(fatal_file, line));
            }
            self.fatals.record(file, event);
        }

        let status = match dump.status {
            DumpStatus::Valid => UnitStatus::Valid,
            DumpStatus::Invalid(reason) => UnitStatus::Invalid { reason },
        };

        self.units.push(LoadedUnit {
            name: dump.unit,
            file,
            tree,
            status,
        });
        Ok(())
    }

    fn add_unloadable(&mut self, path: &Path, error: &DumpError) {
        let display = path.display().to_string();
        let name = path
            .file_stem()
            .map_or_else(|| display.clone(), |s| s.to_string_lossy().into_owned());
        let file = self.files.intern(&display);
        self.units.push(LoadedUnit {
            name,
            file,
            tree: ArenaTree::leaf(NodeKind::SourceText, SourceLocation::new(file, 1)),
            status: UnitStatus::Invalid {
                reason: error.to_string(),
            },
        });
    }

    /// Returns the number of loaded units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if nothing was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns an observer replaying the recorded fatal events.
    #[must_use]
    pub fn fatal_observer(&self) -> RecordedFatals {
        self.fatals.clone()
    }
}

impl Design for LoadedDesign {
    fn compilation_units(&self) -> Vec<CompilationUnit<'_>> {
        self.units
            .iter()
            .map(|u| CompilationUnit::new(&u.name, u.file, &u.tree, &u.status))
            .collect()
    }

    fn resolve_path(&self, file: FileId) -> Option<&str> {
        self.files.get(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::fatal::FatalObserver;
    use crate::query;
    use crate::tree::SyntaxTree;

    const TOP: &str = r#"{
        "unit": "top",
        "path": "rtl/top.sv",
        "fatal": [
            { "message": "cannot elaborate", "line": 12 },
            { "message": "no location" }
        ],
        "root": {
            "kind": "source_text", "line": 1,
            "children": [
                { "kind": "data_declaration", "line": 3, "file": "rtl/defs.svh" },
                { "kind": "always_construct", "line": 7 }
            ]
        }
    }"#;

    const BROKEN: &str = r#"{
        "unit": "broken",
        "path": "rtl/broken.sv",
        "status": { "invalid": "syntax error near 'endmodule'" },
        "root": { "kind": "source_text", "line": 1 }
    }"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn pkg(path: &str, fatal: &str) -> UnitDump {
        let json = format!(
            r#"{{ "unit": "pkg", "path": "{path}", "fatal": [{fatal}],
                 "root": {{ "kind": "source_text", "line": 1 }} }}"#
        );
        UnitDump::from_json(&json).unwrap()
    }

    #[test]
    fn loads_units_in_order_with_file_table() {
        let dir = tempfile::tempdir().unwrap();
        let top = write(dir.path(), "top.json", TOP);
        let broken = write(dir.path(), "broken.json", BROKEN);

        let design = LoadedDesign::load_files([&top, &broken]);
        let units = design.compilation_units();
        assert_eq!(units.len(), 2);

        assert_eq!(units[0].name, "top");
        assert!(units[0].is_valid());
        assert_eq!(design.resolve_path(units[0].file), Some("rtl/top.sv"));

        let tree = units[0].tree;
        let decl = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.kind(decl), NodeKind::DataDeclaration);
        assert_eq!(design.resolve_path(tree.location(decl).file), Some("rtl/defs.svh"));
        let other = tree.next_sibling(decl).unwrap();
        assert_eq!(tree.kind(other), NodeKind::Other);
        assert_eq!(design.resolve_path(tree.location(other).file), Some("rtl/top.sv"));

        assert_eq!(units[1].name, "broken");
        assert_eq!(
            units[1].status,
            &UnitStatus::Invalid {
                reason: "syntax error near 'endmodule'".to_string()
            }
        );
    }

    #[test]
    fn records_fatal_events_per_unit() {
        let mut design = LoadedDesign::new();
        design.add_dump(UnitDump::from_json(TOP).unwrap()).unwrap();

        let observer = design.fatal_observer();
        let units = design.compilation_units();
        let events = observer.observe(&units[0]);

        assert_eq!(events.len(), 2);
        let loc = events[0].location.unwrap();
        assert_eq!(loc.line, 12);
        assert_eq!(design.resolve_path(loc.file), Some("rtl/top.sv"));
        assert!(events[1].location.is_none());
    }

    #[test]
    fn same_unit_name_in_two_files_keeps_fatals_apart() {
        let mut design = LoadedDesign::new();
        design
            .add_dump(pkg("a/pkg.sv", r#"{ "message": "only in a" }"#))
            .unwrap();
        design.add_dump(pkg("b/pkg.sv", "")).unwrap();

        let result = Dispatcher::builder()
            .fatal_observer(design.fatal_observer())
            .parallelism(1)
            .build()
            .unwrap()
            .run(&design.compilation_units());

        assert_eq!(result.fatal.len(), 1);
        assert_eq!(result.fatal[0].message, "only in a");
    }

    #[test]
    fn rejects_duplicate_unit() {
        let mut design = LoadedDesign::new();
        design.add_dump(pkg("pkg.sv", "")).unwrap();
        let err = design.add_dump(pkg("pkg.sv", "")).unwrap_err();
        assert!(matches!(err, DumpError::DuplicateUnit { .. }));
        assert_eq!(design.len(), 1);
    }

    #[test]
    fn loads_deeply_nested_trees() {
        let depth = 2_000;
        let mut json = String::from(r#"{ "unit": "deep", "path": "deep.sv", "root": "#);
        for _ in 0..depth {
            json.push_str(r#"{ "kind": "expression", "line": 1, "children": ["#);
        }
        json.push_str(r#"{ "kind": "identifier", "line": 1, "name": "x" }"#);
        for _ in 0..depth {
            json.push_str("] }");
        }
        json.push('}');

        let mut design = LoadedDesign::new();
        design.add_dump(UnitDump::from_json(&json).unwrap()).unwrap();

        let units = design.compilation_units();
        let tree = units[0].tree;
        assert_eq!(query::descendants(tree, tree.root()).count(), depth);
    }

    #[test]
    fn unloadable_dump_becomes_invalid_unit() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.json", "{ \"unit\": ");
        let top = write(dir.path(), "top.json", TOP);

        let design = LoadedDesign::load_files([&bad, &top]);
        let units = design.compilation_units();
        assert_eq!(units.len(), 2);

        assert_eq!(units[0].name, "bad");
        assert!(!units[0].is_valid());
        assert_eq!(
            design.resolve_path(units[0].file),
            Some(bad.display().to_string().as_str())
        );
        assert!(units[1].is_valid());

        let result = Dispatcher::builder()
            .parallelism(1)
            .build()
            .unwrap()
            .run(&units);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].reason.starts_with("Invalid dump"));
        assert_eq!(result.units_checked, 1);
    }

    #[test]
    fn rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.json", "{ \"unit\": ");
        let err = LoadedDesign::new().load_file(&path).unwrap_err();
        assert!(matches!(err, DumpError::Json { .. }));
    }

    #[test]
    fn rejects_zero_lines() {
        let dump = r#"{ "unit": "u", "path": "u.sv", "root": { "kind": "source_text", "line": 0 } }"#;
        let err = LoadedDesign::new()
            .add_dump(UnitDump::from_json(dump).unwrap())
            .unwrap_err();
        assert!(matches!(err, DumpError::Tree { .. }));
        assert!(err.to_string().starts_with("Invalid tree in u.sv"));
    }

    #[test]
    fn rejected_tree_leaves_no_paths_behind() {
        let dump = r#"{ "unit": "u", "path": "u.sv", "root": {
            "kind": "source_text", "line": 1, "children": [
                { "kind": "data_declaration", "line": 2, "file": "inc.svh" },
                { "kind": "data_declaration", "line": 0 }
            ] } }"#;
        let mut design = LoadedDesign::new();
        design
            .add_dump(UnitDump::from_json(dump).unwrap())
            .unwrap_err();
        assert_eq!(design.files.len(), 0);

        design.add_dump(UnitDump::from_json(BROKEN).unwrap()).unwrap();
        assert_eq!(design.resolve_path(FileId::new(0)), Some("rtl/broken.sv"));
        assert_eq!(design.resolve_path(FileId::new(1)), None);
    }

    #[test]
    fn file_table_reuses_ids_after_truncate() {
        let mut files = FileTable::default();
        let top = files.intern("rtl/top.sv");
        let defs = files.intern("rtl/defs.svh");
        assert_eq!(files.intern("rtl/top.sv"), top);
        assert_eq!(files.len(), 2);

        files.truncate(1);
        assert_eq!(files.get(defs), None);
        assert_eq!(files.intern("rtl/top.sv"), top);
        assert_eq!(files.intern("rtl/pkg.sv"), defs);
        assert_eq!(files.get(defs), Some("rtl/pkg.sv"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadedDesign::new()
            .load_file(&dir.path().join("absent.json"))
            .unwrap_err();
        assert!(matches!(err, DumpError::Io { .. }));
    }
}
