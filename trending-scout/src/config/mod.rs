//! Configuration loading.
//!
//! Settings come from an optional `scout.toml`:
//!
//! ```toml
//! [search]
//! per-page = 50
//! max-results = 100
//! concurrency = 4
//!
//! [scoring]
//! topic-cap = 5
//! [scoring.language-boosts]
//! rust = 1.3
//!
//! [analysis]
//! timeout-secs = 120
//!
//! [llm]
//! provider = "anthropic"
//! model = "claude-sonnet-4-5"
//! ```
//!
//! A missing file means defaults everywhere.

mod error;
mod sections;

pub use error::ConfigError;
pub use sections::{AnalysisConfig, SearchConfig};

use crate::fetch::SEARCH_RESULT_WINDOW;
use crate::llm::LlmConfig;
use crate::scoring::ScoringConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";

/// Parsed contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScoutConfigFile {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Completion model; falls back to `TRENDING_SCOUT_LLM_MODEL`.
    pub llm: Option<LlmConfig>,
}

impl ScoutConfigFile {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if the file does not exist, and
    /// other [`ConfigError`]s if it cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        }

        debug!(path = %path.display(), "Loading config");
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Loads a configuration file, using defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an existing file cannot be read, parsed
    /// or validated.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::MissingFile { .. }) => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parses and validates TOML content. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TomlError`] or [`ConfigError::ValidationError`].
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlError {
            path: path.to_string(),
            source: e,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Validates ranges, clamping `max-results` to the provider's window.
    fn validate(&mut self, path: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.to_string(),
            message,
        };

        let search = &mut self.search;
        if !(1..=100).contains(&search.per_page) {
            return Err(invalid(format!(
                "per-page must be between 1 and 100, got {}",
                search.per_page
            )));
        }
        if search.max_results == 0 {
            return Err(invalid("max-results must be at least 1".to_string()));
        }
        let window = SEARCH_RESULT_WINDOW as usize;
        if search.max_results > window {
            warn!(
                max_results = search.max_results,
                window, "max-results exceeds the search window, capping"
            );
            search.max_results = window;
        }
        if search.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1".to_string()));
        }
        if search.initial_quota == Some(0) {
            return Err(invalid("initial-quota must be at least 1".to_string()));
        }

        if self.analysis.timeout_secs == 0 {
            return Err(invalid("timeout-secs must be at least 1".to_string()));
        }

        if let Some((language, boost)) = self
            .scoring
            .language_boosts
            .iter()
            .find(|(_, boost)| !boost.is_finite() || boost.is_sign_negative())
        {
            return Err(invalid(format!(
                "language boost for '{language}' must be a non-negative number, got {boost}"
            )));
        }

        Ok(())
    }
}
