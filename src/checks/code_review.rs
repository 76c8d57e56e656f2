//! Code-Review: does the project review changes before they land?
//!
//! Four independent heuristics, any one of which can show review:
//!
//! | heuristic                  | evidence                               |
//! |----------------------------|----------------------------------------|
//! | `branch_protection_review` | default branch requires approvals      |
//! | `github_approvals`         | merged PRs with an approving review    |
//! | `prow_labels`              | merged PRs carrying an approval label  |
//! | `commit_trailers`          | commits with gerrit review trailers    |

use crate::checker::{any_of, CheckError, CheckFn, CheckRequest, CheckResult, MAX_CONFIDENCE};
use crate::models::{PullRequest, Review};
use crate::scoring::proportional_result;

pub const CHECK_CODE_REVIEW: &str = "Code-Review";

const HEURISTICS: &[CheckFn] = &[
    branch_protection_review,
    github_approvals,
    prow_labels,
    commit_trailers,
];

/// Registered entry point for [`CHECK_CODE_REVIEW`].
pub fn does_code_review(req: &CheckRequest<'_>) -> CheckResult {
    any_of(CHECK_CODE_REVIEW, HEURISTICS, req)
}

/// Pass outright when the default branch requires at least one approval.
///
/// Protection settings the caller may not read (401/403/404, usually
/// missing admin rights) are absent evidence and come back inconclusive.
/// Every other failure, cancellation included, is retryable.
pub fn branch_protection_review(req: &CheckRequest<'_>) -> CheckResult {
    let repository = match req.repository() {
        Ok(repository) => repository,
        Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
    };

    let protection = match req.branch_protection(&repository.default_branch) {
        Ok(protection) => protection,
        Err(e) if e.is_access_denied() => {
            req.log(format_args!(
                "cannot read branch protection for {}: {}",
                repository.default_branch, e
            ));
            return CheckResult::inconclusive(CHECK_CODE_REVIEW, e);
        }
        Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
    };

    let required = protection.required_approvals();
    if required >= 1 {
        req.log(format_args!(
            "pull request reviews required before merge on {} ({} approval(s))",
            repository.default_branch, required
        ));
        return CheckResult::pass(CHECK_CODE_REVIEW, MAX_CONFIDENCE);
    }

    CheckResult::inconclusive(CHECK_CODE_REVIEW, CheckError::ReviewNotEnforced)
}

/// Share of merged pull requests that were approved.
///
/// A merge commit authored by someone other than its committer also counts,
/// since somebody else had to land the change.
pub fn github_approvals(req: &CheckRequest<'_>) -> CheckResult {
    let pull_requests = match req.closed_pull_requests() {
        Ok(prs) => prs,
        Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
    };

    let mut merged = 0;
    let mut reviewed = 0;
    for pr in pull_requests.iter().filter(|pr| pr.is_merged()) {
        merged += 1;

        let reviews = match req.reviews(pr.number) {
            Ok(reviews) => reviews,
            Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
        };
        if reviews.iter().any(Review::is_approval) {
            req.log(format_args!("found review approved pr: {}", pr.number));
            reviewed += 1;
            continue;
        }

        match merged_by_someone_else(req, pr) {
            Ok(true) => {
                req.log(format_args!(
                    "found pr with committer different than author: {}",
                    pr.number
                ));
                reviewed += 1;
            }
            Ok(false) => {}
            Err(result) => return result,
        }
    }

    if merged == 0 {
        return CheckResult::inconclusive(
            CHECK_CODE_REVIEW,
            CheckError::NoEligibleObservations("merged pull requests"),
        );
    }
    proportional_result(CHECK_CODE_REVIEW, reviewed, merged, req.review().threshold)
}

fn merged_by_someone_else(req: &CheckRequest<'_>, pr: &PullRequest) -> Result<bool, CheckResult> {
    let Some(sha) = pr.merge_commit_sha.as_deref() else {
        return Ok(false);
    };
    let commit = req
        .commit(sha)
        .map_err(|e| CheckResult::retry(CHECK_CODE_REVIEW, e))?;

    let author = commit.author_login();
    let committer = commit.committer_login();
    Ok(!author.is_empty() && !committer.is_empty() && author != committer)
}

/// Share of merged pull requests labelled as approved (prow style).
pub fn prow_labels(req: &CheckRequest<'_>) -> CheckResult {
    let pull_requests = match req.closed_pull_requests() {
        Ok(prs) => prs,
        Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
    };

    let review = req.review();
    let mut merged = 0;
    let mut reviewed = 0;
    for pr in pull_requests.iter().filter(|pr| pr.is_merged()) {
        merged += 1;
        if let Some(label) = review.approval_labels.iter().find(|l| pr.has_label(l)) {
            req.log(format_args!("found {} label on pr: {}", label, pr.number));
            reviewed += 1;
        }
    }

    if merged == 0 {
        return CheckResult::inconclusive(
            CHECK_CODE_REVIEW,
            CheckError::NoEligibleObservations("merged pull requests"),
        );
    }
    if reviewed == 0 {
        return CheckResult::inconclusive(CHECK_CODE_REVIEW, CheckError::NoReviews);
    }
    proportional_result(CHECK_CODE_REVIEW, reviewed, merged, review.threshold)
}

/// Share of human commits carrying review trailers (gerrit style).
pub fn commit_trailers(req: &CheckRequest<'_>) -> CheckResult {
    let commits = match req.commits() {
        Ok(commits) => commits,
        Err(e) => return CheckResult::retry(CHECK_CODE_REVIEW, e),
    };

    let review = req.review();
    let mut total = 0;
    let mut reviewed = 0;
    for commit in &commits {
        let committer = commit.committer_login();
        if review.is_bot(committer) {
            req.log(format_args!("skip commit from bot account: {}", committer));
            continue;
        }
        total += 1;
        if review.has_review_trailers(commit.message()) {
            req.log(format_args!("found reviewed commit: {}", commit.sha));
            reviewed += 1;
        }
    }

    if total == 0 {
        return CheckResult::inconclusive(
            CHECK_CODE_REVIEW,
            CheckError::NoEligibleObservations("commits"),
        );
    }
    if reviewed == 0 {
        return CheckResult::inconclusive(CHECK_CODE_REVIEW, CheckError::NoReviews);
    }
    proportional_result(CHECK_CODE_REVIEW, reviewed, total, review.threshold)
}
