//! Check execution with caller-side retry policy
//!
//! The checks themselves never retry: they classify a failed fetch as
//! retryable and return. The runner is the caller that decides whether to
//! try again.
//!
//! ```text
//! names ──▶ resolve all (unknown -> error, nothing runs)
//!        ──▶ run each (rayon when parallel), re-running retryable results
//!        ──▶ outcomes in the order requested
//! ```

use crate::checker::{CheckError, CheckFn, CheckRegistry, CheckRequest, CheckResult, Verdict};
use crate::config::RunnerConfig;
use crate::models::RepoRef;
use rayon::prelude::*;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One check's final result plus execution metadata
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub result: CheckResult,
    pub verdict: Verdict,
    /// Times the check ran (1 when no retries happened)
    pub attempts: u32,
    pub duration_ms: u64,
}

/// Verdict counts across a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub checks_run: usize,
    pub passed: usize,
    pub failed: usize,
    pub retryable: usize,
    pub inconclusive: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn add_outcome(&mut self, outcome: &CheckOutcome) {
        self.checks_run += 1;
        self.total_duration_ms += outcome.duration_ms;
        match outcome.verdict {
            Verdict::Pass => self.passed += 1,
            Verdict::Fail => self.failed += 1,
            Verdict::Retryable => self.retryable += 1,
            Verdict::Inconclusive => self.inconclusive += 1,
        }
    }

    pub fn from_outcomes(outcomes: &[CheckOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.add_outcome(outcome);
        }
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.checks_run
    }
}

/// Everything produced by one evaluation of a repository
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub repo: RepoRef,
    pub provider: String,
    pub outcomes: Vec<CheckOutcome>,
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl RunReport {
    pub fn new(repo: RepoRef, provider: impl Into<String>, outcomes: Vec<CheckOutcome>) -> Self {
        let summary = RunSummary::from_outcomes(&outcomes);
        Self {
            repo,
            provider: provider.into(),
            outcomes,
            summary,
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

pub struct CheckRunner<'r> {
    registry: &'r CheckRegistry,
    config: RunnerConfig,
}

impl<'r> CheckRunner<'r> {
    pub fn new(registry: &'r CheckRegistry, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run one named check.
    pub fn run(&self, name: &str, req: &CheckRequest<'_>) -> Result<CheckOutcome, CheckError> {
        let check = self.registry.require(name)?;
        Ok(self.execute(name, check, req))
    }

    /// Run several named checks; outcomes follow the order of `names`.
    ///
    /// Every name is resolved before anything runs, so an unknown check
    /// never leaves a partial run behind. Repeated names run once.
    pub fn run_many<S: AsRef<str>>(
        &self,
        names: &[S],
        req: &CheckRequest<'_>,
    ) -> Result<Vec<CheckOutcome>, CheckError> {
        let mut resolved: Vec<(&str, CheckFn)> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if resolved.iter().any(|(n, _)| *n == name) {
                continue;
            }
            resolved.push((name, self.registry.require(name)?));
        }

        info!(
            "Running {} check(s) against {} ({})",
            resolved.len(),
            req.repo_ref(),
            req.provider_name()
        );

        let outcomes = if self.config.parallel && resolved.len() > 1 {
            resolved
                .par_iter()
                .map(|(name, check)| self.execute(name, *check, req))
                .collect()
        } else {
            resolved
                .iter()
                .map(|(name, check)| self.execute(name, *check, req))
                .collect()
        };

        Ok(outcomes)
    }

    /// Run every registered check, in name order.
    pub fn run_all(&self, req: &CheckRequest<'_>) -> Vec<CheckOutcome> {
        let names = self.registry.names();
        // Names come from the registry itself, so resolution cannot fail.
        self.run_many(names.as_slice(), req).unwrap_or_default()
    }

    fn execute(&self, name: &str, check: CheckFn, req: &CheckRequest<'_>) -> CheckOutcome {
        let start = Instant::now();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0;

        let mut result = loop {
            attempts += 1;
            let result = check(req);
            if !result.is_retryable() || attempts >= max_attempts || !req.is_live() {
                break result;
            }
            warn!(
                "{} attempt {}/{} was retryable: {}",
                name,
                attempts,
                max_attempts,
                result
                    .cause()
                    .map(|c| c.to_string())
                    .unwrap_or_default()
            );
            if self.config.retry_backoff_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
            }
        };

        if result.name != name {
            warn!(
                "Check {} reported its result as {}; renaming",
                name, result.name
            );
            result = result.renamed(name);
        }

        let verdict = result.verdict();
        info!(
            "{}: {} (confidence {}, {} attempt(s))",
            name, verdict, result.confidence, attempts
        );

        CheckOutcome {
            result,
            verdict,
            attempts,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
