//! Built-in checks
//!
//! Each check is a plain function registered under a stable name. Add new
//! checks here and to [`register_builtin`].

mod code_review;

pub use code_review::{
    branch_protection_review, commit_trailers, does_code_review, github_approvals, prow_labels,
    CHECK_CODE_REVIEW,
};

use crate::checker::CheckRegistry;

/// Register every built-in check.
pub fn register_builtin(registry: &mut CheckRegistry) {
    registry.register(CHECK_CODE_REVIEW, does_code_review);
}
