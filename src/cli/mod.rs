//! CLI command definitions and handlers

mod init;
mod list;
mod run;

pub use run::{evaluate, FailOn};

use crate::config::{load_config_file, load_project_config, ProjectConfig};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// scorecheck - heuristic repository practice checks
#[derive(Parser, Debug)]
#[command(name = "scorecheck")]
#[command(
    version,
    about = "Evaluate whether a repository follows a practice (e.g. code review) from its hosting-service evidence",
    after_help = "\
Examples:
  scorecheck run ossf/scorecard                     Run every check
  scorecheck run ossf/scorecard --check Code-Review Run one check
  scorecheck run ossf/scorecard --format json       JSON output for scripting
  scorecheck run ossf/scorecard --fail-on fail      Exit code 1 on a failing check (CI mode)
  scorecheck list                                   Show registered checks
  scorecheck init                                   Write scorecheck.toml

Set GITHUB_AUTH_TOKEN (or GITHUB_TOKEN) to raise API rate limits."
)]
pub struct Cli {
    /// Config file (default: ./scorecheck.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run checks against a repository
    #[command(after_help = "\
Examples:
  scorecheck run ossf/scorecard
  scorecheck run https://github.com/ossf/scorecard --show-details
  scorecheck run ossf/scorecard --format json -o result.json
  scorecheck run ossf/scorecard --timeout 60 --fail-on error")]
    Run {
        /// Repository: owner/repo, github.com/owner/repo or a GitHub URL
        repo: String,

        /// Check to run (repeatable; default: [checks].run from config, else all)
        #[arg(long = "check", short = 'c', value_name = "NAME")]
        checks: Vec<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Include the checks' diagnostic lines in the report
        #[arg(long)]
        show_details: bool,

        /// Give up on evidence fetches after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Exit with code 1 when a check fails (fail) or does not pass (error)
        #[arg(long, value_parser = ["fail", "error"])]
        fail_on: Option<String>,
    },

    /// List registered checks
    List,

    /// Write a scorecheck.toml config file with default settings
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Explicit `--config` must load; an auto-discovered one may fall back.
fn resolve_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(load_project_config(Path::new("."))),
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run {
            repo,
            checks,
            format,
            output,
            show_details,
            timeout,
            fail_on,
        }) => {
            let config = resolve_config(cli.config.as_deref())?;
            let fail_on = fail_on.as_deref().map(str::parse::<FailOn>).transpose()?;
            run::run(
                &repo,
                &config,
                &checks,
                &format,
                output.as_deref(),
                show_details,
                timeout,
                fail_on,
            )
        }

        Some(Commands::List) => list::run(),

        Some(Commands::Init { path }) => init::run(&path),

        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "scorecheck",
            "run",
            "ossf/scorecard",
            "--check",
            "Code-Review",
            "-c",
            "Other",
            "--format",
            "json",
            "--timeout",
            "30",
            "--fail-on",
            "error",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Some(Commands::Run {
                repo,
                checks,
                format,
                timeout,
                fail_on,
                show_details,
                ..
            }) => {
                assert_eq!(repo, "ossf/scorecard");
                assert_eq!(checks, vec!["Code-Review", "Other"]);
                assert_eq!(format, "json");
                assert_eq!(timeout, Some(30));
                assert_eq!(fail_on.as_deref(), Some("error"));
                assert!(!show_details);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["scorecheck", "run", "o/r", "--format", "sarif"]).is_err());
    }

    #[test]
    fn test_init_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["scorecheck", "init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { path }) if path == Path::new(".")));
    }

    #[test]
    fn test_explicit_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(resolve_config(Some(&missing)).is_err());
    }
}
