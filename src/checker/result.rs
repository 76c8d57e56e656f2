//! Per-check result model

use crate::checker::CheckError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Lowest confidence value
pub const MIN_CONFIDENCE: u8 = 0;
/// Certainty, e.g. an explicit repository setting was observed
pub const MAX_CONFIDENCE: u8 = 10;

/// Why a result carries no definitive verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The evidence fetch failed; running the check again may succeed
    Retryable,
    /// Evidence was fetched but too sparse to form an opinion
    Inconclusive,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultError {
    pub class: ErrorClass,
    #[serde(serialize_with = "serialize_cause")]
    pub cause: Arc<CheckError>,
}

fn serialize_cause<S: Serializer>(cause: &Arc<CheckError>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(cause)
}

/// Flattened view of a result for reporting and folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    Retryable,
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Retryable => write!(f, "retryable"),
            Verdict::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Outcome of one check invocation.
///
/// `pass` and `confidence` are only meaningful when `error` is `None`;
/// branch on [`CheckResult::verdict`] before trusting them.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub pass: bool,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResultError>,
}

impl CheckResult {
    /// Definitive positive result
    pub fn pass(name: impl Into<String>, confidence: u8) -> Self {
        Self {
            name: name.into(),
            pass: true,
            confidence: confidence.min(MAX_CONFIDENCE),
            error: None,
        }
    }

    /// Definitive negative result
    pub fn fail(name: impl Into<String>, confidence: u8) -> Self {
        Self {
            name: name.into(),
            pass: false,
            confidence: confidence.min(MAX_CONFIDENCE),
            error: None,
        }
    }

    /// The evidence fetch itself failed
    pub fn retry(name: impl Into<String>, cause: impl Into<CheckError>) -> Self {
        Self::classified(name, ErrorClass::Retryable, cause.into())
    }

    /// Evidence was fetched but is absent or too sparse
    pub fn inconclusive(name: impl Into<String>, cause: impl Into<CheckError>) -> Self {
        Self::classified(name, ErrorClass::Inconclusive, cause.into())
    }

    fn classified(name: impl Into<String>, class: ErrorClass, cause: CheckError) -> Self {
        Self {
            name: name.into(),
            pass: false,
            confidence: MIN_CONFIDENCE,
            error: Some(ResultError {
                class,
                cause: Arc::new(cause),
            }),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match &self.error {
            Some(e) if e.class == ErrorClass::Retryable => Verdict::Retryable,
            Some(_) => Verdict::Inconclusive,
            None if self.pass => Verdict::Pass,
            None => Verdict::Fail,
        }
    }

    pub fn error_class(&self) -> Option<ErrorClass> {
        self.error.as_ref().map(|e| e.class)
    }

    pub fn cause(&self) -> Option<&CheckError> {
        self.error.as_ref().map(|e| e.cause.as_ref())
    }

    pub fn is_definitive_pass(&self) -> bool {
        self.verdict() == Verdict::Pass
    }

    pub fn is_retryable(&self) -> bool {
        self.error_class() == Some(ErrorClass::Retryable)
    }

    pub fn is_inconclusive(&self) -> bool {
        self.error_class() == Some(ErrorClass::Inconclusive)
    }

    /// Same result reported under another check name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
