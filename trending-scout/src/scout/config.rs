//! Engine configuration.

use crate::config::DEFAULT_CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Configuration for constructing a [`Scout`](super::Scout).
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    /// GitHub token; anonymous access when absent.
    token: Option<String>,
    /// Path to the TOML configuration file.
    config_path: PathBuf,
    /// Overrides `[search] concurrency`.
    concurrency: Option<usize>,
    /// Overrides `[search] max-results`.
    max_results: Option<usize>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScoutConfig {
    /// Creates a configuration reading `scout.toml` from the working
    /// directory.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            concurrency: None,
            max_results: None,
        }
    }

    /// Sets a custom config file path.
    pub fn with_config_path(mut self, config_path: PathBuf) -> Self {
        self.config_path = config_path;
        self
    }

    /// Overrides the number of queries fetched in parallel.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Overrides the per-query result cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the config file path.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the concurrency override.
    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    /// Returns the result cap override.
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }
}
