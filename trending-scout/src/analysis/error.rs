//! Analysis error types.

use crate::fetch::{FetchError, UpstreamCause};
use crate::prompts::PromptError;
use crate::repository::MalformedRecord;
use thiserror::Error;

/// Error produced while analyzing a repository.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The identifier is not in owner/name form.
    #[error("Invalid repository identifier '{0}': expected owner/name")]
    InvalidIdentifier(String),

    /// No text-completion model is configured.
    #[error("No text-completion model is configured")]
    CompletionUnavailable,

    /// Fetching the repository record failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The fetched record could not be decoded.
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    /// The prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// The completion call failed or timed out.
    #[error("Analysis of '{repository}' failed: {cause}")]
    Upstream {
        repository: String,
        cause: UpstreamCause,
    },
}
