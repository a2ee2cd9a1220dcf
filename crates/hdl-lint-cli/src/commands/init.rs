//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_FILE: &str = "hdl-lint.toml";

const DEFAULT_CONFIG: &str = r#"# hdl-lint configuration

# Lowest severity that makes `hdl-lint check` exit with status 1
fail_on = "error"

# Whether fatal elaboration events recorded in the dumps fail the run
fatal_fails = true

[dispatcher]
# Worker threads (default: available parallelism)
# parallelism = 4

# Rule configurations, keyed by rule name or id.
# Each rule can be enabled/disabled and have its severity overridden.

[rules.repetition-in-sequence]
enabled = true

[rules.implicit-data-type]
enabled = true
# severity = "warning"
placeholder_name = "<unknown>"

[rules.prototype-return-data-type]
enabled = true
exempt_constructors = false

[rules.parameter-dynamic-array]
enabled = true

[rules.hierarchical-interface-identifier]
enabled = true

[rules.dpi-declaration-string]
enabled = true

[rules.class-variable-lifetime]
enabled = true

[rules.covergroup-expression]
enabled = true
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("."), force)?;

    println!("Created {CONFIG_FILE}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE} to configure rules");
    println!("  2. Export tree dumps from your front-end");
    println!("  3. Run: hdl-lint check <dump-dir>");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}
