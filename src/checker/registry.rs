//! Name -> check function registry
//!
//! The process-wide registry is built once, on first use, by
//! [`global_registry`] and is read-only afterwards, so lookups need no
//! locking. Registering a name twice is a programming error and panics.

use crate::checker::{CheckError, CheckRequest, CheckResult};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

/// A check: evidence in, exactly one result out
pub type CheckFn = fn(&CheckRequest<'_>) -> CheckResult;

#[derive(Default)]
pub struct CheckRegistry {
    checks: HashMap<&'static str, CheckFn>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `check` under `name`.
    ///
    /// # Panics
    /// If `name` is already registered.
    pub fn register(&mut self, name: &'static str, check: CheckFn) {
        if let Err(e) = self.try_register(name, check) {
            panic!("invalid check registry: {e}");
        }
    }

    pub fn try_register(&mut self, name: &'static str, check: CheckFn) -> Result<(), CheckError> {
        if self.checks.contains_key(name) {
            return Err(CheckError::DuplicateCheck(name.to_string()));
        }
        debug!("Registered check {}", name);
        self.checks.insert(name, check);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<CheckFn> {
        self.checks.get(name).copied()
    }

    /// Like [`resolve`](Self::resolve), but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<CheckFn, CheckError> {
        self.resolve(name)
            .ok_or_else(|| CheckError::UnknownCheck(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.checks.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

static GLOBAL: OnceLock<CheckRegistry> = OnceLock::new();

/// Registry holding every built-in check.
pub fn global_registry() -> &'static CheckRegistry {
    GLOBAL.get_or_init(|| {
        let mut registry = CheckRegistry::new();
        crate::checks::register_builtin(&mut registry);
        registry
    })
}
