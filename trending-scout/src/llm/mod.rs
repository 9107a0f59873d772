//! Text-completion capability backed by serdes-ai.
//!
//! The rest of the crate only sees the [`Completion`] trait: a prompt plus
//! an optional system instruction goes in, free text comes out. No output
//! schema is assumed; callers parse leniently.

mod config;
mod error;

pub use config::{LlmConfig, Provider};
pub use error::LlmError;

use async_trait::async_trait;
use serdes_ai::agent::{Agent, AgentBuilder};
use serdes_ai_models::Model;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const MODEL_ENV: &str = "TRENDING_SCOUT_LLM_MODEL";
const TEMPERATURE_ENV: &str = "TRENDING_SCOUT_LLM_TEMPERATURE";

/// A black-box text completion service.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Completes `prompt`, optionally steered by a `system` instruction.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if the provider call fails.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError>;
}

/// Runs a completion bounded by `timeout`.
///
/// # Errors
///
/// Returns [`LlmError::Timeout`] if the deadline passes first, or whatever
/// the completion itself returned.
pub async fn complete_within(
    completion: &dyn Completion,
    system: Option<&str>,
    prompt: &str,
    timeout: Duration,
) -> Result<String, LlmError> {
    tokio::time::timeout(timeout, completion.complete(system, prompt))
        .await
        .map_err(|_| LlmError::Timeout(timeout.as_secs()))?
}

/// [`Completion`] implementation running a serdes-ai model.
#[derive(Clone)]
pub struct ModelCompletion {
    model: Arc<dyn Model>,
    temperature: Option<f64>,
}

impl ModelCompletion {
    /// Resolves a model from the `[llm]` table, falling back to the
    /// `TRENDING_SCOUT_LLM_MODEL` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingModel`] if neither source names a model,
    /// or a model error if the provider cannot be built.
    pub fn from_config(config: Option<&LlmConfig>) -> Result<Self, LlmError> {
        Ok(Self {
            model: resolve_model(config)?,
            temperature: resolve_temperature(config),
        })
    }
}

impl std::fmt::Debug for ModelCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCompletion")
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Completion for ModelCompletion {
    async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
        let agent = build_agent(self.model.clone(), system, self.temperature);
        debug!(prompt_len = prompt.len(), "Running completion");
        let result = agent.run(prompt.to_string(), ()).await?;
        Ok(result.output)
    }
}

/// Resolves the LLM model from config or environment.
fn resolve_model(config: Option<&LlmConfig>) -> Result<Arc<dyn Model>, LlmError> {
    if let Some(config) = config {
        return config.build_model();
    }
    let model_spec = std::env::var(MODEL_ENV).map_err(|_| LlmError::MissingModel)?;
    serdes_ai_models::infer_model(&model_spec).map_err(LlmError::Model)
}

/// Validates that a temperature value is finite and within 0.0-2.0.
fn validate_temperature(value: f64, source: &str) -> Option<f64> {
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        tracing::warn!(
            "Invalid temperature {value} from {source}: must be finite and in range 0.0-2.0"
        );
        return None;
    }
    Some(value)
}

/// Resolves the temperature from environment or config.
///
/// Environment variable takes precedence over config file.
fn resolve_temperature(config: Option<&LlmConfig>) -> Option<f64> {
    if let Ok(val) = std::env::var(TEMPERATURE_ENV) {
        if let Ok(temp) = val.parse::<f64>() {
            return validate_temperature(temp, "environment variable");
        }
    }
    config
        .and_then(LlmConfig::temperature)
        .and_then(|t| validate_temperature(t, "config file"))
}

/// Builds a tool-less agent for a single completion.
fn build_agent(
    model: Arc<dyn Model>,
    system: Option<&str>,
    temperature: Option<f64>,
) -> Agent<(), String> {
    let mut builder = AgentBuilder::from_arc(model);

    if let Some(system) = system {
        builder = builder.system_prompt(system.to_string());
    }
    if let Some(temp) = temperature {
        builder = builder.temperature(temp);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    #[async_trait]
    impl Completion for Slow {
        async fn complete(&self, _: Option<&str>, _: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    struct Echo;

    #[async_trait]
    impl Completion for Echo {
        async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
            Ok(format!("{}|{prompt}", system.unwrap_or("-")))
        }
    }

    fn openai(temperature: Option<f64>) -> LlmConfig {
        LlmConfig {
            temperature,
            ..LlmConfig::new(Provider::OpenAi, "gpt-4o")
        }
    }

    #[tokio::test]
    async fn complete_within_times_out() {
        let err = complete_within(&Slow, None, "hi", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout(_)));
    }

    #[tokio::test]
    async fn complete_within_passes_through() {
        let out = complete_within(&Echo, Some("sys"), "hi", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, "sys|hi");
    }

    #[test]
    fn resolve_model_requires_config_or_env() {
        temp_env::with_var_unset(MODEL_ENV, || {
            assert!(matches!(resolve_model(None), Err(LlmError::MissingModel)));
        });
    }

    #[test]
    fn resolve_temperature_returns_none_without_config_or_env() {
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(None), None);
        });
    }

    #[test]
    fn resolve_temperature_uses_config_value() {
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(Some(&openai(Some(0.3)))), Some(0.3));
        });
    }

    #[test]
    fn resolve_temperature_prefers_env_over_config() {
        temp_env::with_var(TEMPERATURE_ENV, Some("0.8"), || {
            assert_eq!(resolve_temperature(Some(&openai(Some(0.3)))), Some(0.8));
        });
    }

    #[test]
    fn resolve_temperature_rejects_out_of_range() {
        temp_env::with_var_unset(TEMPERATURE_ENV, || {
            assert_eq!(resolve_temperature(Some(&openai(Some(3.5)))), None);
        });
    }
}
