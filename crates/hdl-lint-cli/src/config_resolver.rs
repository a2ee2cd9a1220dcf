//! Locating and loading `hdl-lint.toml`.
//!
//! The first match wins:
//!
//! 1. `--config` (or `$HDL_LINT_CONFIG`)
//! 2. `hdl-lint.toml`, then `.hdl-lint.toml`, in the project directory
//! 3. `config.toml` in `$HDL_LINT_CONFIG_DIR`, else in `~/.hdl-lint/`
//! 4. built-in defaults

use anyhow::{Context, Result};
use hdl_lint_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given on the command line; not checked for existence.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the per-user directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the config file path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` for the per-user fallback.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Reads and parses the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if self.is_global() {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

const PROJECT_CONFIG_NAMES: [&str; 2] = ["hdl-lint.toml", ".hdl-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration source for `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_with(project_dir, explicit, global_config_dir().as_deref())
}

/// Same as [`resolve`] with the global directory injected, so tests do not
/// depend on the environment.
fn resolve_with(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|p| p.is_file())
    {
        tracing::debug!("Found project config: {}", found.display());
        return ConfigSource::Project(found);
    }

    match global_dir.map(|d| d.join(GLOBAL_CONFIG_NAME)) {
        Some(p) if p.is_file() => {
            tracing::debug!("Found global config: {}", p.display());
            ConfigSource::Global(p)
        }
        _ => ConfigSource::Default,
    }
}

/// Per-user config directory: `$HDL_LINT_CONFIG_DIR`, else `~/.hdl-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("HDL_LINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".hdl-lint")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdl_lint_core::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, "").unwrap();
        p
    }

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let project = TempDir::new().unwrap();
        touch(project.path(), "hdl-lint.toml");
        let missing = Path::new("/nonexistent/hdl-lint.toml");

        assert_eq!(
            resolve_with(project.path(), Some(missing), None),
            ConfigSource::Explicit(missing.to_path_buf())
        );
    }

    #[test]
    fn project_names_in_priority_order() {
        let project = TempDir::new().unwrap();
        let dotted = touch(project.path(), ".hdl-lint.toml");
        assert_eq!(
            resolve_with(project.path(), None, None),
            ConfigSource::Project(dotted)
        );

        let plain = touch(project.path(), "hdl-lint.toml");
        assert_eq!(
            resolve_with(project.path(), None, None),
            ConfigSource::Project(plain)
        );
    }

    #[test]
    fn global_is_the_last_fallback() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(
            resolve_with(project.path(), None, Some(global.path())),
            ConfigSource::Default
        );

        let cfg = touch(global.path(), "config.toml");
        assert_eq!(
            resolve_with(project.path(), None, Some(global.path())),
            ConfigSource::Global(cfg)
        );

        touch(project.path(), "hdl-lint.toml");
        assert!(matches!(
            resolve_with(project.path(), None, Some(global.path())),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn path_and_is_global() {
        let p = PathBuf::from("/tmp/x.toml");
        for (source, global) in [
            (ConfigSource::Explicit(p.clone()), false),
            (ConfigSource::Project(p.clone()), false),
            (ConfigSource::Global(p.clone()), true),
        ] {
            assert_eq!(source.path(), Some(p.as_path()));
            assert_eq!(source.is_global(), global);
        }
        assert!(ConfigSource::Default.path().is_none());
        assert!(!ConfigSource::Default.is_global());
    }

    #[test]
    fn load_parses_file_or_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hdl-lint.toml");
        fs::write(&path, "fail_on = \"warning\"\n").unwrap();

        let config = ConfigSource::Project(path).load().unwrap();
        assert_eq!(config.fail_threshold(), Severity::Warning);

        let config = ConfigSource::Default.load().unwrap();
        assert_eq!(config.fail_threshold(), Severity::Error);

        let err = ConfigSource::Explicit(dir.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));
    }
}
