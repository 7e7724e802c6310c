//! The `pinelint` CLI: argument parsing, logging bootstrap, and the
//! `check` command's orchestration of [`pinelint_sem::Pipeline`].

mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use error::{CliError, Result};
use pinelint_sem::Pipeline;
use pinelint_util::Report;

/// PineLint - Pine Script static analyzer.
#[derive(Parser, Debug)]
#[command(name = "pinelint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A static analyzer for Pine Script", long_about = None)]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true, env = "PINELINT_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a Pine Script file for issues
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the .pine file to check
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Initializes the global `tracing` subscriber from `PINELINT_LOG`, falling
/// back to `debug` or `info` depending on `--verbose`.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("PINELINT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(())
}

/// Runs the `check` subcommand end to end: reads `file`, drives the
/// pipeline, prints the report in the requested format, and returns the
/// process exit code (`0` clean, `1` at least one error diagnostic).
///
/// A missing or unreadable file returns [`CliError`] instead, which the
/// caller maps to exit code `2`.
pub fn run_check(args: &CheckArgs) -> Result<i32> {
    if !args.file.exists() {
        return Err(CliError::FileNotFound(args.file.clone()));
    }

    let source = std::fs::read_to_string(&args.file).map_err(|source| CliError::Io {
        path: args.file.clone(),
        source,
    })?;

    info!(file = %args.file.display(), "checking file");
    let report = Pipeline::new().run(&source, file_label(&args.file).as_deref());
    debug!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "check complete"
    );

    print_report(&report, args.format)?;

    Ok(if report.has_errors() { 1 } else { 0 })
}

fn file_label(path: &Path) -> Option<String> {
    Some(path.display().to_string())
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_check_with_defaults() {
        let cli = Cli::parse_from(["pinelint", "check", "script.pine"]);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.file, PathBuf::from("script.pine"));
                assert_eq!(args.format, OutputFormat::Text);
            }
        }
    }

    #[test]
    fn cli_parses_json_format_flag() {
        let cli = Cli::parse_from(["pinelint", "check", "script.pine", "--format", "json"]);
        match cli.command {
            Commands::Check(args) => assert_eq!(args.format, OutputFormat::Json),
        }
    }

    #[test]
    fn run_check_reports_file_not_found() {
        let args = CheckArgs {
            file: PathBuf::from("/nonexistent/definitely-not-here.pine"),
            format: OutputFormat::Text,
        };
        let err = run_check(&args).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn run_check_returns_zero_for_clean_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("pinelint_cli_test_clean.pine");
        std::fs::write(&path, "//@version=5\nindicator(\"T\")\nplot(close)\n").unwrap();
        let args = CheckArgs { file: path.clone(), format: OutputFormat::Text };
        let code = run_check(&args).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(code, 0);
    }

    #[test]
    fn run_check_returns_one_for_file_with_errors() {
        let dir = std::env::temp_dir();
        let path = dir.join("pinelint_cli_test_dirty.pine");
        std::fs::write(&path, "plot(undefined_thing)\n").unwrap();
        let args = CheckArgs { file: path.clone(), format: OutputFormat::Text };
        let code = run_check(&args).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(code, 1);
    }
}
