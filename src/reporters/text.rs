//! Text (terminal) reporter with colors and formatting

use crate::checker::{CheckOutcome, RunReport, Verdict};
use anyhow::Result;

/// Verdict colors (ANSI escape codes)
fn verdict_color(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "\x1b[32m",         // Green
        Verdict::Fail => "\x1b[31m",         // Red
        Verdict::Retryable => "\x1b[33m",    // Yellow
        Verdict::Inconclusive => "\x1b[90m", // Gray
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn verdict_tag(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "PASS",
        Verdict::Fail => "FAIL",
        Verdict::Retryable => "RETRY",
        Verdict::Inconclusive => "?",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &RunReport) -> Result<String> {
    let mut out = String::new();

    out.push_str(&format!("\n{BOLD}scorecheck{RESET} {}\n", report.repo));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));

    if report.outcomes.is_empty() {
        out.push_str("No checks were run.\n");
        return Ok(out);
    }

    out.push_str(&format!(
        "{DIM}  RESULT  SCORE  CHECK                     REASON{RESET}\n"
    ));
    for outcome in &report.outcomes {
        out.push_str(&format_outcome(outcome));
    }
    out.push('\n');

    let s = &report.summary;
    let mut parts = vec![format!("\x1b[32m{} passed{RESET}", s.passed)];
    if s.failed > 0 {
        parts.push(format!("\x1b[31m{} failed{RESET}", s.failed));
    }
    if s.retryable > 0 {
        parts.push(format!("\x1b[33m{} retryable{RESET}", s.retryable));
    }
    if s.inconclusive > 0 {
        parts.push(format!("\x1b[90m{} inconclusive{RESET}", s.inconclusive));
    }
    out.push_str(&format!(
        "{BOLD}SUMMARY{RESET} {}  {DIM}({} via {}, {}ms){RESET}\n",
        parts.join(" | "),
        s.checks_run,
        report.provider,
        s.total_duration_ms
    ));

    if !report.details.is_empty() {
        out.push_str(&format!("\n{BOLD}DETAILS{RESET}\n"));
        for line in &report.details {
            out.push_str(&format!("  {DIM}{line}{RESET}\n"));
        }
    }

    Ok(out)
}

fn format_outcome(outcome: &CheckOutcome) -> String {
    let verdict = outcome.verdict;
    let color = verdict_color(verdict);
    let score = match verdict {
        Verdict::Pass | Verdict::Fail => format!("{:>2}/10", outcome.result.confidence),
        Verdict::Retryable | Verdict::Inconclusive => "  -  ".to_string(),
    };
    let mut reason = outcome
        .result
        .cause()
        .map(|c| c.to_string())
        .unwrap_or_default();
    if outcome.attempts > 1 {
        reason = format!("{reason} (after {} attempts)", outcome.attempts);
    }

    format!(
        "  {color}{:<6}{RESET}  {}  {:<24}  {DIM}{}{RESET}\n",
        verdict_tag(verdict),
        score,
        outcome.result.name,
        reason.trim()
    )
}
