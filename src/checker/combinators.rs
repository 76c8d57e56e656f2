//! Structural checks built from other checks

use crate::checker::{CheckError, CheckFn, CheckRequest, CheckResult, Verdict};
use tracing::debug;

/// Pass if any child strongly signals a pass.
///
/// Children run in order against the same request and evaluation stops at
/// the first definitive pass. Otherwise every child runs and the results
/// fold, in priority order, to:
///
/// 1. the first retryable result (a failed fetch might have hidden a pass),
/// 2. the definitive fail with the highest confidence (first wins ties),
/// 3. the last inconclusive result.
///
/// Whatever is returned is renamed to `name`. No children is inconclusive.
pub fn any_of(name: &str, checks: &[CheckFn], req: &CheckRequest<'_>) -> CheckResult {
    let mut first_retry: Option<CheckResult> = None;
    let mut strongest_fail: Option<CheckResult> = None;
    let mut last_inconclusive: Option<CheckResult> = None;

    for (index, check) in checks.iter().enumerate() {
        let result = check(req);
        debug!(
            "{} child {} -> {} (confidence {})",
            name,
            index,
            result.verdict(),
            result.confidence
        );

        match result.verdict() {
            Verdict::Pass => return result.renamed(name),
            Verdict::Retryable => {
                if first_retry.is_none() {
                    first_retry = Some(result);
                }
            }
            Verdict::Fail => {
                let stronger = strongest_fail
                    .as_ref()
                    .map_or(true, |f| result.confidence > f.confidence);
                if stronger {
                    strongest_fail = Some(result);
                }
            }
            Verdict::Inconclusive => last_inconclusive = Some(result),
        }
    }

    first_retry
        .or(strongest_fail)
        .or(last_inconclusive)
        .map(|r| r.renamed(name))
        .unwrap_or_else(|| CheckResult::inconclusive(name, CheckError::NoChecks))
}
