//! hdl-lint CLI tool.
//!
//! Usage:
//! ```bash
//! hdl-lint check [OPTIONS] [INPUTS]...
//! hdl-lint list-rules
//! hdl-lint init
//! ```
//!
//! Exit status: 0 when clean, 1 when diagnostics or fatal events fail the
//! run, 2 on usage, configuration or I/O errors.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hdl_lint_core::ReportFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for SystemVerilog syntax trees exported by a parser front-end
#[derive(Parser)]
#[command(name = "hdl-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HDL_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks on tree dumps
    Check {
        /// Dump files or directories to scan for `*.json` dumps
        #[arg(default_value = ".")]
        inputs: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or ids)
        #[arg(long)]
        rules: Option<String>,

        /// Number of worker threads (default: available parallelism)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per diagnostic.
    #[default]
    Text,
    /// JSON document.
    Json,
    /// Graphical reports.
    Fancy,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Fancy => Self::Fancy,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    match cli.command {
        Commands::Check {
            inputs,
            format,
            rules,
            jobs,
        } => {
            let source = config_resolver::resolve(std::path::Path::new("."), cli.config.as_deref());
            let code = commands::check::run(&inputs, format, rules, jobs, &source)?;
            Ok(u8::try_from(code).unwrap_or(1))
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(0)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(0)
        }
    }
}
