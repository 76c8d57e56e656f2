//! GitHub REST evidence provider
//!
//! Uses ureq (sync HTTP) so checks stay plain blocking functions.
//! Listings are paginated with `per_page`/`page` up to a configured page cap;
//! the default samples only the most recent page, which is what the review
//! heuristics are tuned for.
//!
//! Each HTTP call is bounded by the shorter of `timeout_secs` and the time
//! left before the caller's deadline.

use crate::evidence::{EvidenceError, EvidenceProvider, EvidenceResult, FetchLimits};
use crate::models::{BranchProtection, Commit, PullRequest, Repository, Review};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API root, without trailing slash
    pub api_url: String,
    /// Items requested per page (GitHub caps this at 100)
    pub per_page: u32,
    /// Maximum pages fetched per listing
    pub max_pages: u32,
    /// Global per-request timeout
    pub timeout_secs: u64,
    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            per_page: 30,
            max_pages: 1,
            timeout_secs: 30,
            token_env: "GITHUB_AUTH_TOKEN".to_string(),
        }
    }
}

impl GitHubConfig {
    /// Resolve the API token from `token_env`, then `GITHUB_TOKEN`.
    pub fn token_from_env(&self) -> Option<String> {
        env::var(&self.token_env)
            .or_else(|_| env::var("GITHUB_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

pub struct GitHubClient {
    config: GitHubConfig,
    token: Option<String>,
    timeout: Duration,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // statuses are mapped to EvidenceError::Status below
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl GitHubClient {
    pub fn new(config: GitHubConfig, token: Option<String>) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        Self {
            config,
            token,
            timeout,
            agent: make_agent(timeout),
        }
    }

    pub fn from_env(config: GitHubConfig) -> Self {
        let token = config.token_from_env();
        if token.is_none() {
            debug!(
                "No GitHub token in {} or GITHUB_TOKEN; using unauthenticated requests",
                config.token_env
            );
        }
        Self::new(config, token)
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn repo_url(&self, owner: &str, repo: &str, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.config.api_url.trim_end_matches('/'),
            owner,
            repo,
            tail
        )
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, limits: FetchLimits) -> EvidenceResult<T> {
        let budget = limits.remaining()?.filter(|left| *left < self.timeout);
        debug!("GET {} (budget {:?})", url, budget);
        let mut req = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", concat!("scorecheck/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = &self.token {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(left) = budget {
            req = req.config().timeout_global(Some(left)).build();
        }

        let response = req.call().map_err(|e| match e {
            ureq::Error::Timeout(_) if budget.is_some() => EvidenceError::DeadlineExceeded,
            ureq::Error::Io(ref io)
                if budget.is_some() && io.kind() == std::io::ErrorKind::TimedOut =>
            {
                EvidenceError::DeadlineExceeded
            }
            e => EvidenceError::Transport(e.to_string()),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(EvidenceError::Status {
                status,
                url: url.to_string(),
                message: truncate(&message, 200),
            });
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| EvidenceError::Decode(e.to_string()))
    }

    /// Fetch up to `max_pages` pages of a listing endpoint.
    fn get_paginated<T: DeserializeOwned>(
        &self,
        base_url: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<T>> {
        let per_page = self.config.per_page.clamp(1, 100);
        let separator = if base_url.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();

        for page in 1..=self.config.max_pages.max(1) {
            let url = format!("{base_url}{separator}per_page={per_page}&page={page}");
            let batch: Vec<T> = self.get_json(&url, limits)?;
            let len = batch.len();
            items.extend(batch);
            if len < per_page as usize {
                break;
            }
        }

        Ok(items)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

impl EvidenceProvider for GitHubClient {
    fn name(&self) -> &'static str {
        "github"
    }

    fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<PullRequest>> {
        self.get_paginated(&self.repo_url(owner, repo, "/pulls?state=closed"), limits)
    }

    fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<Review>> {
        self.get_paginated(
            &self.repo_url(owner, repo, &format!("/pulls/{number}/reviews")),
            limits,
        )
    }

    fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Commit> {
        self.get_json(&self.repo_url(owner, repo, &format!("/commits/{sha}")), limits)
    }

    fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Vec<Commit>> {
        self.get_paginated(&self.repo_url(owner, repo, "/commits"), limits)
    }

    fn get_repository(
        &self,
        owner: &str,
        repo: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<Repository> {
        self.get_json(&self.repo_url(owner, repo, ""), limits)
    }

    fn get_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        limits: FetchLimits,
    ) -> EvidenceResult<BranchProtection> {
        self.get_json(
            &self.repo_url(owner, repo, &format!("/branches/{branch}/protection")),
            limits,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_default_config() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.per_page, 30);
        assert_eq!(config.max_pages, 1);
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let client = GitHubClient::new(
            GitHubConfig {
                api_url: "https://ghe.example.com/api/v3/".to_string(),
                ..Default::default()
            },
            None,
        );
        assert_eq!(
            client.repo_url("ossf", "scorecard", "/pulls?state=closed"),
            "https://ghe.example.com/api/v3/repos/ossf/scorecard/pulls?state=closed"
        );
        assert_eq!(
            client.repo_url("ossf", "scorecard", ""),
            "https://ghe.example.com/api/v3/repos/ossf/scorecard"
        );
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let client = GitHubClient::new(
            GitHubConfig {
                api_url: "http://127.0.0.1:1".to_string(),
                timeout_secs: 2,
                ..Default::default()
            },
            None,
        );
        let err = client
            .get_repository("ossf", "scorecard", FetchLimits::default())
            .unwrap_err();
        assert!(matches!(err, EvidenceError::Transport(_)), "got {err:?}");
    }

    #[test]
    fn test_deadline_cuts_silent_server_short() {
        // Accepts connections (via the backlog) but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = GitHubClient::new(
            GitHubConfig {
                api_url: format!("http://{addr}"),
                timeout_secs: 10,
                ..Default::default()
            },
            None,
        );

        let start = Instant::now();
        let limits = FetchLimits::until(Some(start + Duration::from_millis(200)));
        let err = client
            .get_repository("ossf", "scorecard", limits)
            .unwrap_err();

        assert_eq!(err, EvidenceError::DeadlineExceeded);
        assert!(
            start.elapsed() < Duration::from_secs(3),
            "fetch ran for {:?}",
            start.elapsed()
        );
        drop(listener);
    }

    #[test]
    fn test_expired_deadline_skips_request() {
        let client = GitHubClient::new(
            GitHubConfig {
                api_url: "http://127.0.0.1:1".to_string(),
                ..Default::default()
            },
            None,
        );
        let limits = FetchLimits::until(Some(Instant::now()));
        assert_eq!(
            client.list_commits("ossf", "scorecard", limits).unwrap_err(),
            EvidenceError::DeadlineExceeded
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
