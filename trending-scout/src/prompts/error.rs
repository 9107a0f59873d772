//! Prompt rendering error types.

/// Prompt rendering error.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Handlebars rendering error.
    #[error("Prompt rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}
