//! Diagnostic sinks for check requests
//!
//! Lines written here are observability only; no check reads them back.

use crate::models::RepoRef;
use std::sync::Mutex;
use tracing::debug;

pub trait LogSink: Send + Sync {
    fn log(&self, repo: &RepoRef, line: &str);
}

/// Forwards lines to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, repo: &RepoRef, line: &str) {
        debug!(target: "scorecheck::checks", repo = %repo, "{}", line);
    }
}

/// Captures lines in memory (for `--show-details` and tests)
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|l| l.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn log(&self, _repo: &RepoRef, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }
}
