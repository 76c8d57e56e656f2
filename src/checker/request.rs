//! Per-evaluation request handed to every check

use crate::checker::LogSink;
use crate::config::ReviewConfig;
use crate::evidence::{EvidenceError, EvidenceProvider, EvidenceResult, FetchLimits};
use crate::models::{BranchProtection, Commit, PullRequest, RepoRef, Repository, Review};
use std::fmt;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Everything a check needs to evaluate one repository.
///
/// Built once per evaluation and shared by reference with every check and
/// combinator run against it. Evidence is only reachable through the fetch
/// methods below. The deadline bounds every provider call, including one
/// already in flight; cancellation is observed before and after each call.
pub struct CheckRequest<'a> {
    repo: RepoRef,
    provider: &'a dyn EvidenceProvider,
    logger: &'a dyn LogSink,
    review: &'a ReviewConfig,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl<'a> CheckRequest<'a> {
    pub fn new(
        repo: RepoRef,
        provider: &'a dyn EvidenceProvider,
        logger: &'a dyn LogSink,
        review: &'a ReviewConfig,
    ) -> Self {
        Self {
            repo,
            provider,
            logger,
            review,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn repo_ref(&self) -> &RepoRef {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo.repo
    }

    pub fn review(&self) -> &ReviewConfig {
        self.review
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Write a diagnostic line to the request's sink.
    pub fn log(&self, line: impl fmt::Display) {
        self.logger.log(&self.repo, &line.to_string());
    }

    /// Err when the request was cancelled or its deadline has passed.
    pub fn ensure_live(&self) -> EvidenceResult<()> {
        if self.cancel.is_cancelled() {
            return Err(EvidenceError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(EvidenceError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    pub fn is_live(&self) -> bool {
        self.ensure_live().is_ok()
    }

    /// Limits handed to the provider for the next call
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits::until(self.deadline)
    }

    /// A fetch that completes after cancellation is discarded.
    fn fetch<T>(
        &self,
        op: impl FnOnce(&dyn EvidenceProvider, FetchLimits) -> EvidenceResult<T>,
    ) -> EvidenceResult<T> {
        self.ensure_live()?;
        let out = op(self.provider, self.fetch_limits());
        self.ensure_live()?;
        out
    }

    pub fn closed_pull_requests(&self) -> EvidenceResult<Vec<PullRequest>> {
        self.fetch(|p, limits| p.list_closed_pull_requests(self.owner(), self.repo(), limits))
    }

    pub fn reviews(&self, number: u64) -> EvidenceResult<Vec<Review>> {
        self.fetch(|p, limits| p.list_reviews(self.owner(), self.repo(), number, limits))
    }

    pub fn commit(&self, sha: &str) -> EvidenceResult<Commit> {
        self.fetch(|p, limits| p.get_commit(self.owner(), self.repo(), sha, limits))
    }

    pub fn commits(&self) -> EvidenceResult<Vec<Commit>> {
        self.fetch(|p, limits| p.list_commits(self.owner(), self.repo(), limits))
    }

    pub fn repository(&self) -> EvidenceResult<Repository> {
        self.fetch(|p, limits| p.get_repository(self.owner(), self.repo(), limits))
    }

    pub fn branch_protection(&self, branch: &str) -> EvidenceResult<BranchProtection> {
        self.fetch(|p, limits| p.get_branch_protection(self.owner(), self.repo(), branch, limits))
    }
}
