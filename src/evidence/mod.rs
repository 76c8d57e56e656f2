//! Evidence providers
//!
//! Checks never talk to a hosting service directly. They are handed an
//! [`EvidenceProvider`] that lists pull requests, reviews, commits and
//! branch-protection rules for a repository. Every operation may fail; the
//! check layer decides how each failure is classified.
//!
//! - [`GitHubClient`] - GitHub REST API over sync HTTP
//! - [`FakeProvider`] - in-memory evidence with injectable failures

mod fake;
mod github;

pub use fake::{FakeProvider, Operation};
pub use github::{GitHubClient, GitHubConfig};

use crate::models::{BranchProtection, Commit, PullRequest, Repository, Review};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors returned by evidence providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvidenceError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("evidence fetch cancelled")]
    Cancelled,

    #[error("evidence fetch deadline exceeded")]
    DeadlineExceeded,
}

impl EvidenceError {
    /// True when the fetch was stopped by the caller rather than failing.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, EvidenceError::Cancelled | EvidenceError::DeadlineExceeded)
    }

    /// True for 401/403/404: the caller may not see the resource, or it
    /// does not exist. Nothing about retrying would change the answer.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, EvidenceError::Status { status: 401 | 403 | 404, .. })
    }
}

/// Bounds a provider must respect for a single call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchLimits {
    /// The call must have returned by this instant
    pub deadline: Option<Instant>,
}

impl FetchLimits {
    pub fn until(deadline: Option<Instant>) -> Self {
        Self { deadline }
    }

    /// Time left before the deadline (`None` when unbounded).
    ///
    /// Err once the deadline has passed, so a provider never starts a call
    /// it has no time for.
    pub fn remaining(&self) -> EvidenceResult<Option<Duration>> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    Err(EvidenceError::DeadlineExceeded)
                } else {
                    Ok(Some(deadline - now))
                }
            }
        }
    }
}

pub type EvidenceResult<T> = Result<T, EvidenceError>;

/// Source of repository evidence.
///
/// Implementations must be shareable across threads: the runner may
/// evaluate several checks against one provider concurrently. Every call
/// receives [`FetchLimits`] and must give up with
/// [`EvidenceError::DeadlineExceeded`] rather than run past its deadline.
pub trait EvidenceProvider: Send + Sync {
    /// Short identifier used in logs (e.g. "github")
    fn name(&self) -> &'static str;

    /// Closed pull requests, most recent first
    fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<PullRequest>>;

    fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<Review>>;

    fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Commit>;

    /// Recent commits on the default branch
    fn list_commits(&self, owner: &str, repo: &str, limits: FetchLimits)
        -> EvidenceResult<Vec<Commit>>;

    fn get_repository(&self, owner: &str, repo: &str, limits: FetchLimits)
        -> EvidenceResult<Repository>;

    fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<BranchProtection>;
}
