//! Configuration module for scorecheck
//!
//! This module handles:
//! - Project-level configuration (scorecheck.toml)
//! - Review heuristic settings (threshold, bot denylist, labels, trailers)
//! - Runner retry policy
//! - GitHub client settings

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, ChecksConfig, ConfigError, ProjectConfig,
    ReviewConfig, RunnerConfig, CONFIG_FILE_NAME, EXAMPLE_CONFIG,
};
