//! In-memory evidence provider
//!
//! Holds hand-built evidence and can be told to fail individual operations.
//! Call counters let tests assert which fetches actually happened.

use crate::evidence::{EvidenceError, EvidenceProvider, EvidenceResult, FetchLimits};
use crate::models::{BranchProtection, Commit, PullRequest, Repository, Review};
use std::collections::HashMap;
use std::sync::Mutex;

/// Provider operations, used to inject failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListPullRequests,
    ListReviews,
    GetCommit,
    ListCommits,
    GetRepository,
    GetBranchProtection,
}

#[derive(Default)]
pub struct FakeProvider {
    pub pull_requests: Vec<PullRequest>,
    pub reviews: HashMap<u64, Vec<Review>>,
    pub commits: Vec<Commit>,
    /// Commits reachable by SHA (merge commits), separate from the listing
    pub commits_by_sha: HashMap<String, Commit>,
    pub repository: Option<Repository>,
    pub protections: HashMap<String, BranchProtection>,
    failures: HashMap<Operation, EvidenceError>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_request(mut self, pr: PullRequest, reviews: Vec<Review>) -> Self {
        self.reviews.insert(pr.number, reviews);
        self.pull_requests.push(pr);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn with_merge_commit(mut self, commit: Commit) -> Self {
        self.commits_by_sha.insert(commit.sha.clone(), commit);
        self
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_branch_protection(
        mut self,
        branch: impl Into<String>,
        protection: BranchProtection,
    ) -> Self {
        self.protections.insert(branch.into(), protection);
        self
    }

    /// Make every call to `op` fail with `error`.
    pub fn failing(mut self, op: Operation, error: EvidenceError) -> Self {
        self.failures.insert(op, error);
        self
    }

    /// Number of times `op` was invoked.
    pub fn calls(&self, op: Operation) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.get(&op).copied().unwrap_or(0)
    }

    fn enter(&self, op: Operation, limits: FetchLimits) -> EvidenceResult<()> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            *calls.entry(op).or_insert(0) += 1;
        }
        limits.remaining()?;
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn not_found(what: String) -> EvidenceError {
        EvidenceError::Status {
            status: 404,
            url: what,
            message: "Not Found".to_string(),
        }
    }
}

impl EvidenceProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn list_closed_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<PullRequest>> {
        self.enter(Operation::ListPullRequests, limits)?;
        Ok(self.pull_requests.clone())
    }

    fn list_reviews(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<Review>> {
        self.enter(Operation::ListReviews, limits)?;
        Ok(self.reviews.get(&number).cloned().unwrap_or_default())
    }

    fn get_commit(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Commit> {
        self.enter(Operation::GetCommit, limits)?;
        self.commits_by_sha
            .get(sha)
            .or_else(|| self.commits.iter().find(|c| c.sha == sha))
            .cloned()
            .ok_or_else(|| Self::not_found(format!("commits/{sha}")))
    }

    fn list_commits(
        &self,
        _owner: &str,
        _repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<Commit>> {
        self.enter(Operation::ListCommits, limits)?;
        Ok(self.commits.clone())
    }

    fn get_repository(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Repository> {
        self.enter(Operation::GetRepository, limits)?;
        Ok(self.repository.clone().unwrap_or_else(|| Repository {
            full_name: format!("{owner}/{repo}"),
            default_branch: "main".to_string(),
        }))
    }

    fn get_branch_protection(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<BranchProtection> {
        self.enter(Operation::GetBranchProtection, limits)?;
        self.protections
            .get(branch)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("branches/{branch}/protection")))
    }
}
