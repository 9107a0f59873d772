//! LLM error types.

use thiserror::Error;

/// Errors raised while resolving a model or running a completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// LLM model not configured.
    #[error("LLM model not configured; set TRENDING_SCOUT_LLM_MODEL or the [llm] config table")]
    MissingModel,

    /// LLM operation timed out.
    #[error("LLM timed out after {0} seconds")]
    Timeout(u64),

    /// Model error.
    #[error("Model error: {0}")]
    Model(#[from] serdes_ai_models::ModelError),

    /// Agent run error.
    #[error("Agent run error: {0}")]
    AgentRun(#[from] serdes_ai::agent::AgentRunError),

    /// The completion provider failed for another reason.
    #[error("Completion failed: {0}")]
    Completion(String),
}
