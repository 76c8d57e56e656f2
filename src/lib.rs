//! scorecheck - heuristic repository practice checks
//!
//! Named checks inspect a repository's hosting-service evidence (pull
//! requests, reviews, commits, branch protection) and each return one
//! [`checker::CheckResult`]: a pass/fail verdict with a 0-10 confidence, or
//! a classification of why no verdict could be reached.

pub mod checker;
pub mod checks;
pub mod cli;
pub mod config;
pub mod evidence;
pub mod models;
pub mod reporters;
pub mod scoring;
