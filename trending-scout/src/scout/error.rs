//! Engine error types.

/// Errors that can occur while running the engine.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// Completion model initialization errors.
    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),

    /// Invalid discovery request.
    #[error(transparent)]
    Query(#[from] crate::query::QueryError),

    /// Every query failed before returning any page.
    #[error(transparent)]
    Fetch(#[from] crate::fetch::FetchError),
}
