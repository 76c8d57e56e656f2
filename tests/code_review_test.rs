//! End-to-end Code-Review scenarios through the public library API
//!
//! Evidence comes from `FakeProvider` (and, for the timeout case, a
//! `GitHubClient` pointed at a local socket that never answers). Checks are
//! resolved through the global registry and executed by `CheckRunner`, as
//! the CLI does.

use chrono::{TimeZone, Utc};
use scorecheck::checker::{
    global_registry, CheckError, CheckRequest, CheckRunner, MemorySink, Verdict, MAX_CONFIDENCE,
};
use scorecheck::checks::CHECK_CODE_REVIEW;
use scorecheck::config::{ProjectConfig, ReviewConfig, RunnerConfig};
use scorecheck::evidence::{EvidenceError, FakeProvider, GitHubClient, GitHubConfig, Operation};
use scorecheck::models::{
    Account, BranchProtection, Commit, CommitDetail, PullRequest, RepoRef, Repository,
    RequiredReviews, Review, ReviewState,
};
use std::net::TcpListener;
use std::time::{Duration, Instant};

fn merged_pr(number: u64) -> PullRequest {
    PullRequest {
        number,
        merged_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single(),
        ..Default::default()
    }
}

fn review(state: ReviewState) -> Review {
    Review {
        state,
        user: Some(Account::new("maintainer")),
    }
}

fn repo() -> RepoRef {
    RepoRef::new("ossf", "scorecard")
}

fn runner_config(max_attempts: u32) -> RunnerConfig {
    RunnerConfig {
        max_attempts,
        retry_backoff_ms: 0,
        parallel: false,
    }
}

#[test]
fn test_eight_of_ten_approved_passes() {
    let provider = (1..=10).fold(FakeProvider::new(), |p, n| {
        let state = if n <= 8 {
            ReviewState::Approved
        } else {
            ReviewState::ChangesRequested
        };
        p.with_pull_request(merged_pr(n), vec![review(state)])
    });
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &provider, &sink, &review_config);

    let runner = CheckRunner::new(global_registry(), runner_config(1));
    let outcome = runner.run(CHECK_CODE_REVIEW, &req).unwrap();

    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.result.name, CHECK_CODE_REVIEW);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(provider.calls(Operation::ListReviews), 10);
}

#[test]
fn test_three_of_five_approved_fails() {
    let provider = (1..=5).fold(FakeProvider::new(), |p, n| {
        let reviews = if n <= 3 {
            vec![review(ReviewState::Commented), review(ReviewState::Approved)]
        } else {
            vec![review(ReviewState::Commented)]
        };
        p.with_pull_request(merged_pr(n), reviews)
    });
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &provider, &sink, &review_config);

    let outcome = CheckRunner::new(global_registry(), runner_config(1))
        .run(CHECK_CODE_REVIEW, &req)
        .unwrap();
    assert_eq!(outcome.verdict, Verdict::Fail);
}

#[test]
fn test_protected_non_default_branch_is_used() {
    let provider = FakeProvider::new()
        .with_repository(Repository {
            full_name: "ossf/scorecard".to_string(),
            default_branch: "trunk".to_string(),
        })
        .with_branch_protection(
            "trunk",
            BranchProtection {
                required_pull_request_reviews: Some(RequiredReviews {
                    required_approving_review_count: 1,
                }),
            },
        );
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &provider, &sink, &review_config);

    let result = (global_registry().resolve(CHECK_CODE_REVIEW).unwrap())(&req);
    assert!(result.is_definitive_pass());
    assert_eq!(result.confidence, MAX_CONFIDENCE);
    assert_eq!(provider.calls(Operation::ListPullRequests), 0);
    assert!(sink.contains("trunk"));
}

#[test]
fn test_transport_error_is_retried_then_reported() {
    let provider = FakeProvider::new()
        .failing(
            Operation::ListCommits,
            EvidenceError::Transport("connection reset".into()),
        );
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &provider, &sink, &review_config);

    let outcome = CheckRunner::new(global_registry(), runner_config(2))
        .run(CHECK_CODE_REVIEW, &req)
        .unwrap();

    assert_eq!(outcome.verdict, Verdict::Retryable);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(provider.calls(Operation::ListCommits), 2);
    assert!(matches!(
        outcome.result.cause(),
        Some(CheckError::Evidence(EvidenceError::Transport(_)))
    ));
}

#[test]
fn test_gerrit_trailers_pass_for_mirrored_repository() {
    let reviewed = "Fix flake\n\nReviewed-on: https://review.example.org/c/42\nReviewed-by: Ann <ann@example.org>";
    let provider = (0..4).fold(FakeProvider::new(), |p, i| {
        p.with_commit(Commit {
            sha: format!("c{i}"),
            author: Some(Account::new("ann")),
            committer: Some(Account::new("gerrit-mirror")),
            commit: CommitDetail {
                message: reviewed.to_string(),
            },
        })
    });
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &provider, &sink, &review_config);

    let outcome = CheckRunner::new(global_registry(), runner_config(1))
        .run(CHECK_CODE_REVIEW, &req)
        .unwrap();
    assert_eq!(outcome.verdict, Verdict::Pass);
    assert_eq!(outcome.result.confidence, MAX_CONFIDENCE);
}

#[test]
fn test_evaluate_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scorecheck.toml");
    std::fs::write(
        &path,
        "[checks]\nrun = [\"Code-Review\"]\n[review]\nthreshold = 0.5\n",
    )
    .unwrap();
    let config: ProjectConfig = scorecheck::config::load_config_file(&path).unwrap();

    let provider = (1..=4).fold(FakeProvider::new(), |p, n| {
        let state = if n <= 2 {
            ReviewState::Approved
        } else {
            ReviewState::Dismissed
        };
        p.with_pull_request(merged_pr(n), vec![review(state)])
    });

    let report =
        scorecheck::cli::evaluate(repo(), &provider, &config, &[], None, true).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.summary.passed, 1);
    assert!(report.details.iter().any(|l| l.contains("approved pr: 1")));
}

#[test]
fn test_request_timeout_bounds_stalled_api() {
    // Connections land in the backlog and are never answered
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = GitHubClient::new(
        GitHubConfig {
            api_url: format!("http://{}", listener.local_addr().unwrap()),
            timeout_secs: 10,
            ..Default::default()
        },
        None,
    );
    let sink = MemorySink::new();
    let review_config = ReviewConfig::default();
    let req = CheckRequest::new(repo(), &client, &sink, &review_config)
        .with_timeout(Duration::from_millis(200));

    let start = Instant::now();
    let result = (global_registry().resolve(CHECK_CODE_REVIEW).unwrap())(&req);
    let elapsed = start.elapsed();

    assert_eq!(result.verdict(), Verdict::Retryable);
    assert!(matches!(
        result.cause(),
        Some(CheckError::Evidence(EvidenceError::DeadlineExceeded))
    ));
    assert!(elapsed < Duration::from_secs(3), "check ran for {elapsed:?}");
    drop(listener);
}
