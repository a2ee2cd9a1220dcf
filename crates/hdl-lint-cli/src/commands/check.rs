//! Check command implementation.

use anyhow::{bail, Context, Result};
use hdl_lint_core::{Design, Dispatcher, LoadedDesign, Reporter};
use hdl_lint_rules::{rules_from_config, select_rules};
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Runs the check command and returns the exit status.
pub fn run(
    inputs: &[PathBuf],
    format: OutputFormat,
    rules_filter: Option<String>,
    jobs: Option<usize>,
    source: &ConfigSource,
) -> Result<i32> {
    let config = source.load()?;

    let mut rules = rules_from_config(&config);
    if let Some(filter) = rules_filter {
        let names: Vec<&str> = filter
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        rules = select_rules(rules, &names)?;
    }

    let dumps = discover_dumps(inputs)?;
    if dumps.is_empty() {
        tracing::warn!("No tree dumps found in {:?}", inputs);
    }
    let design = LoadedDesign::load_files(&dumps);

    let mut builder = Dispatcher::builder()
        .config(config.clone())
        .fatal_observer(design.fatal_observer());
    if let Some(jobs) = jobs {
        builder = builder.parallelism(jobs);
    }
    for rule in rules {
        builder = builder.rule_box(rule);
    }
    let dispatcher = builder.build().context("Failed to build dispatcher")?;

    tracing::info!(
        "Checking {} units with {} rules",
        design.len(),
        dispatcher.registry().len()
    );

    let result = dispatcher.run(&design.compilation_units());

    let reporter = Reporter::from_config(&config).format(format.into());
    reporter
        .render(
            &result,
            &design,
            &mut std::io::stdout().lock(),
            &mut std::io::stderr().lock(),
        )
        .context("Failed to write report")?;

    Ok(reporter.exit_code(&result))
}

/// Expands `inputs` into dump files: files are taken as-is, directories are
/// walked for `*.json`. Each directory's files are sorted; duplicates are
/// dropped.
fn discover_dumps(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            push_unique(&mut files, input.clone());
        } else if input.is_dir() {
            let mut found = walk_dir(input)?;
            found.sort();
            for path in found {
                push_unique(&mut files, path);
            }
        } else {
            bail!("Input not found: {}", input.display());
        }
    }

    Ok(files)
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(false).git_ignore(true);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}
