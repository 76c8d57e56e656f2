//! Project-level configuration support
//!
//! Loads `scorecheck.toml` from the working directory (or an explicit path).
//!
//! # Configuration Format
//!
//! ```toml
//! # scorecheck.toml
//!
//! [checks]
//! run = ["Code-Review"]      # empty = every registered check
//!
//! [review]
//! threshold = 0.75
//! bot_substrings = ["bot", "gardener"]
//! approval_labels = ["lgtm", "approved"]
//! review_trailers = ["\nReviewed-on: ", "\nReviewed-by: "]
//!
//! [runner]
//! max_attempts = 3
//! retry_backoff_ms = 500
//! parallel = true
//!
//! [github]
//! api_url = "https://api.github.com"
//! per_page = 30
//! max_pages = 1
//! timeout_secs = 30
//! token_env = "GITHUB_AUTH_TOKEN"
//! ```

use crate::evidence::GitHubConfig;
use crate::scoring::DEFAULT_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "scorecheck.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub checks: ChecksConfig,
    pub review: ReviewConfig,
    pub runner: RunnerConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Checks run when none are named on the command line (empty = all)
    pub run: Vec<String>,
}

/// Settings shared by the review heuristics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Fraction of sampled artifacts that must show review, in (0, 1]
    pub threshold: f64,
    /// Committer logins containing any of these are skipped as automation
    pub bot_substrings: Vec<String>,
    /// Pull request labels that mark an approval (prow style)
    pub approval_labels: Vec<String>,
    /// Markers that must all appear in a commit message (gerrit style)
    pub review_trailers: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            bot_substrings: vec!["bot".to_string(), "gardener".to_string()],
            approval_labels: vec!["lgtm".to_string(), "approved".to_string()],
            review_trailers: vec![
                "\nReviewed-on: ".to_string(),
                "\nReviewed-by: ".to_string(),
            ],
        }
    }
}

impl ReviewConfig {
    pub fn is_bot(&self, login: &str) -> bool {
        self.bot_substrings
            .iter()
            .any(|s| !s.is_empty() && login.contains(s.as_str()))
    }

    pub fn has_review_trailers(&self, message: &str) -> bool {
        !self.review_trailers.is_empty()
            && self
                .review_trailers
                .iter()
                .all(|t| message.contains(t.as_str()))
    }
}

/// Caller-side retry and scheduling policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Total runs allowed for a check that keeps coming back retryable
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Run independent checks concurrently
    pub parallel: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            retry_backoff_ms: 500,
            parallel: true,
        }
    }
}

impl ProjectConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.review.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "review.threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.review.review_trailers.iter().any(|t| t.is_empty()) {
            return Err(ConfigError::Invalid(
                "review.review_trailers must not contain empty markers".to_string(),
            ));
        }
        if self.runner.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "runner.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err(ConfigError::Invalid(format!(
                "github.per_page must be between 1 and 100, got {}",
                self.github.per_page
            )));
        }
        if self.github.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "github.max_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a specific config file.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProjectConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load `scorecheck.toml` from `dir`, falling back to defaults.
///
/// A broken auto-discovered file is reported and ignored.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Commented template written by `scorecheck init`
pub const EXAMPLE_CONFIG: &str = r#"# scorecheck configuration

[checks]
# Checks to run when none are given on the command line (empty = all)
run = []

[review]
# Fraction of sampled pull requests / commits that must show review
threshold = 0.75
# Committer logins containing any of these substrings are treated as bots
bot_substrings = ["bot", "gardener"]
# Pull request labels that count as an approval
approval_labels = ["lgtm", "approved"]
# Every marker must appear in a commit message for it to count as reviewed
review_trailers = ["\nReviewed-on: ", "\nReviewed-by: "]

[runner]
# Total attempts for checks whose evidence fetch failed (1 = no retries)
max_attempts = 1
retry_backoff_ms = 500
parallel = true

[github]
api_url = "https://api.github.com"
per_page = 30
max_pages = 1
timeout_secs = 30
# Token is read from this variable, then GITHUB_TOKEN
token_env = "GITHUB_AUTH_TOKEN"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProjectConfig::default();
        config.validate().unwrap();
        assert_eq!(config.review.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.runner.max_attempts, 1);
        assert!(config.checks.run.is_empty());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: ProjectConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        let defaults = ProjectConfig::default();
        assert_eq!(config.review.bot_substrings, defaults.review.bot_substrings);
        assert_eq!(config.review.review_trailers, defaults.review.review_trailers);
        assert_eq!(config.github.api_url, defaults.github.api_url);
        assert_eq!(config.runner.max_attempts, defaults.runner.max_attempts);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [review]
            threshold = 0.5

            [runner]
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.review.threshold, 0.5);
        assert_eq!(config.review.approval_labels, vec!["lgtm", "approved"]);
        assert_eq!(config.runner.max_attempts, 3);
        assert!(config.runner.parallel);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        for bad in [0.0, -0.5, 1.5, f64::NAN] {
            let mut config = ProjectConfig::default();
            config.review.threshold = bad;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "threshold {bad} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_zero_attempts_and_bad_paging() {
        let mut config = ProjectConfig::default();
        config.runner.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = ProjectConfig::default();
        config.github.per_page = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bot_detection_uses_substrings() {
        let review = ReviewConfig::default();
        assert!(review.is_bot("dependabot[bot]"));
        assert!(review.is_bot("k8s-ci-robot"));
        assert!(review.is_bot("gardener-ci"));
        assert!(!review.is_bot("octocat"));

        let review = ReviewConfig {
            bot_substrings: vec!["renovate".to_string()],
            ..Default::default()
        };
        assert!(review.is_bot("renovate-app"));
        assert!(!review.is_bot("dependabot[bot]"));
    }

    #[test]
    fn test_review_trailers_must_all_be_present() {
        let review = ReviewConfig::default();
        assert!(review.has_review_trailers(
            "Fix race\n\nReviewed-on: https://review.example.org/123\nReviewed-by: Jane <jane@example.org>"
        ));
        assert!(!review.has_review_trailers(
            "Fix race\n\nReviewed-on: https://review.example.org/123"
        ));
        assert!(!review.has_review_trailers("Reviewed-by: at start of message"));
    }

    #[test]
    fn test_load_project_config_falls_back_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[review\nthreshold = ").unwrap();
        let config = load_project_config(dir.path());
        assert_eq!(config.review.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_load_config_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_config_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let invalid = dir.path().join("invalid.toml");
        std::fs::write(&invalid, "[review]\nthreshold = 2.0\n").unwrap();
        assert!(matches!(
            load_config_file(&invalid),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_project_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[checks]\nrun = [\"Code-Review\"]\n[github]\nmax_pages = 3\n",
        )
        .unwrap();
        let config = load_project_config(dir.path());
        assert_eq!(config.checks.run, vec!["Code-Review"]);
        assert_eq!(config.github.max_pages, 3);
    }
}
