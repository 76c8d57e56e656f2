//! Run command - evaluate checks against a repository

use crate::checker::{
    global_registry, CheckRequest, CheckRunner, LogSink, MemorySink, RunReport, RunSummary,
    TracingSink,
};
use crate::config::ProjectConfig;
use crate::evidence::{EvidenceProvider, GitHubClient};
use crate::models::RepoRef;
use crate::reporters::{report_with_format, OutputFormat};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// When `--fail-on` turns a completed run into a non-zero exit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    /// Any definitive fail
    Fail,
    /// Anything other than a pass
    Error,
}

impl FromStr for FailOn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(FailOn::Fail),
            "error" => Ok(FailOn::Error),
            _ => Err(anyhow!("Unknown --fail-on value '{}'. Valid: fail, error", s)),
        }
    }
}

impl FailOn {
    pub fn is_triggered(self, summary: &RunSummary) -> bool {
        match self {
            FailOn::Fail => summary.failed > 0,
            FailOn::Error => !summary.all_passed(),
        }
    }
}

/// Evaluate checks against one repository through `provider`.
///
/// `checks` empty means the config's `[checks].run` list, and when that is
/// empty too, every registered check. With `capture_details` the checks'
/// diagnostic lines end up in the report instead of the tracing log.
pub fn evaluate(
    repo: RepoRef,
    provider: &dyn EvidenceProvider,
    config: &ProjectConfig,
    checks: &[String],
    timeout: Option<Duration>,
    capture_details: bool,
) -> Result<RunReport> {
    let memory = MemorySink::new();
    let tracing_sink = TracingSink;
    let sink: &dyn LogSink = if capture_details {
        &memory
    } else {
        &tracing_sink
    };

    let mut req = CheckRequest::new(repo.clone(), provider, sink, &config.review);
    if let Some(timeout) = timeout {
        req = req.with_timeout(timeout);
    }

    let runner = CheckRunner::new(global_registry(), config.runner.clone());
    let names = if checks.is_empty() {
        config.checks.run.as_slice()
    } else {
        checks
    };
    let outcomes = if names.is_empty() {
        runner.run_all(&req)
    } else {
        runner.run_many(names, &req)?
    };

    let report = RunReport::new(repo, provider.name(), outcomes);
    Ok(if capture_details {
        report.with_details(memory.lines())
    } else {
        report
    })
}

/// Run the `run` command
#[allow(clippy::too_many_arguments)]
pub fn run(
    repo: &str,
    config: &ProjectConfig,
    checks: &[String],
    format: &str,
    output: Option<&Path>,
    show_details: bool,
    timeout_secs: Option<u64>,
    fail_on: Option<FailOn>,
) -> Result<()> {
    let repo: RepoRef = repo.parse().map_err(|e: String| anyhow!(e))?;
    let format = OutputFormat::from_str(format)?;

    let client = GitHubClient::from_env(config.github.clone());
    if config.github.token_from_env().is_none() {
        warn!(
            "No GitHub token in {} or GITHUB_TOKEN; unauthenticated requests are heavily rate limited",
            config.github.token_env
        );
    }

    info!("Evaluating {}", repo);
    let report = evaluate(
        repo,
        &client,
        config,
        checks,
        timeout_secs.map(Duration::from_secs),
        show_details,
    )?;

    let rendered = report_with_format(&report, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    if let Some(fail_on) = fail_on {
        if fail_on.is_triggered(&report.summary) {
            eprintln!("Failing due to --fail-on={:?} threshold", fail_on);
            std::process::exit(1);
        }
    }
    Ok(())
}
