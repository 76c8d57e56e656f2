//! Check evaluation framework
//!
//! ```text
//! ┌──────────────┐   resolve(name)   ┌───────────────┐
//! │ CheckRunner  │ ────────────────▶ │ CheckRegistry │
//! │ retries,     │                   │ name -> fn    │
//! │ rayon fanout │                   └───────────────┘
//! └──────┬───────┘
//!        │ f(&CheckRequest)
//!        ▼
//! ┌──────────────┐  any_of(...)  ┌──────────────────────────────┐
//! │ check fn     │ ────────────▶ │ heuristic fns (evidence ->   │
//! │ (combinator) │               │ proportional_result / retry /│
//! └──────────────┘               │ inconclusive)                │
//!                                └──────────────────────────────┘
//! ```
//!
//! Every check returns exactly one [`CheckResult`]. Evidence-fetch failures
//! and missing evidence are classified inside the result instead of being
//! raised, so a caller always gets a verdict it can branch on.

mod combinators;
mod log;
mod registry;
mod request;
mod result;
mod runner;

pub use combinators::any_of;
pub use log::{LogSink, MemorySink, TracingSink};
pub use registry::{global_registry, CheckFn, CheckRegistry};
pub use request::CheckRequest;
pub use result::{CheckResult, ErrorClass, ResultError, Verdict, MAX_CONFIDENCE, MIN_CONFIDENCE};
pub use runner::{CheckOutcome, CheckRunner, RunReport, RunSummary};

use crate::evidence::EvidenceError;
use thiserror::Error;

/// Causes attached to non-definitive results, plus framework errors
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error("no reviews found")]
    NoReviews,

    #[error("no {0} found to sample")]
    NoEligibleObservations(&'static str),

    #[error("branch protection does not require approving reviews")]
    ReviewNotEnforced,

    #[error("no checks to combine")]
    NoChecks,

    #[error("unknown check '{0}'")]
    UnknownCheck(String),

    #[error("check '{0}' is already registered")]
    DuplicateCheck(String),
}
