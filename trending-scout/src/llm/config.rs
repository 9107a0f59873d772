//! The `[llm]` table: which completion provider and model to use.

use crate::llm::error::LlmError;
use serde::Deserialize;
use serdes_ai_models::{build_model_with_config, infer_model, openrouter::OpenRouterModel, Model};
use std::sync::Arc;
use std::time::Duration;

/// Completion provider named by `provider = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    OpenRouter,
    Anthropic,
    Gemini,
}

impl Provider {
    /// Prefix used in `provider:model` specs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    /// Environment variable holding the API key when `api-key` is absent.
    #[must_use]
    pub const fn key_env(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }
}

/// Model used for query translation and repository analysis.
///
/// ```toml
/// [llm]
/// provider = "anthropic"
/// model = "claude-3-5-haiku-latest"
/// temperature = 0.2
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    /// Falls back to [`Provider::key_env`].
    #[serde(default)]
    pub api_key: Option<String>,
    /// Not supported by `openrouter`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// HTTP timeout of the provider client. Completion deadlines are set by
    /// `[analysis] timeout-secs`.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl LlmConfig {
    /// Creates a config for `provider` and `model` with nothing else set.
    #[must_use]
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            base_url: None,
            timeout_secs: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    /// `provider:model`, as accepted by `TRENDING_SCOUT_LLM_MODEL`.
    #[must_use]
    pub fn model_spec(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.model)
    }

    fn resolved_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.provider.key_env()).ok())
    }

    /// Builds the provider client.
    pub(crate) fn build_model(&self) -> Result<Arc<dyn Model>, LlmError> {
        let key = self.resolved_key();

        if self.provider == Provider::OpenRouter {
            return match key {
                Some(key) => Ok(Arc::new(OpenRouterModel::new(&self.model, key))),
                None => infer_model(&self.model_spec()).map_err(LlmError::Model),
            };
        }

        if key.is_none() && self.base_url.is_none() && self.timeout_secs.is_none() {
            return infer_model(&self.model_spec()).map_err(LlmError::Model);
        }
        build_model_with_config(
            self.provider.as_str(),
            &self.model,
            key.as_deref(),
            self.base_url.as_deref(),
            self.timeout_secs.map(Duration::from_secs),
        )
        .map_err(LlmError::Model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_table() {
        let config: LlmConfig = toml::from_str(
            r#"
provider = "openrouter"
model = "google/gemini-flash-1.5"
api-key = "sk-test"
temperature = 0.4
"#,
        )
        .unwrap();

        assert_eq!(config.provider, Provider::OpenRouter);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.temperature(), Some(0.4));
        assert_eq!(config.model_spec(), "openrouter:google/gemini-flash-1.5");
    }

    #[test]
    fn optional_fields_default_to_none() {
        let config: LlmConfig =
            toml::from_str("provider = \"gemini\"\nmodel = \"gemini-1.5-flash\"\n").unwrap();

        assert_eq!(config, LlmConfig::new(Provider::Gemini, "gemini-1.5-flash"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let result = toml::from_str::<LlmConfig>("provider = \"mistral\"\nmodel = \"large\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn configured_key_wins_over_environment() {
        let mut config = LlmConfig::new(Provider::Anthropic, "claude-3-5-haiku-latest");

        temp_env::with_var("ANTHROPIC_API_KEY", Some("from-env"), || {
            assert_eq!(config.resolved_key().as_deref(), Some("from-env"));
            config.api_key = Some("from-file".to_string());
            assert_eq!(config.resolved_key().as_deref(), Some("from-file"));
        });
    }
}
