//! Natural-language translation through the text-completion capability.

use super::{parse_lenient, QuerySpec};
use crate::llm::{complete_within, Completion};
use crate::prompts::{PromptRenderer, TRANSLATION_SYSTEM};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Turns natural-language text into a query.
///
/// Returns `None` when no usable query could be produced; the caller owns
/// the fallback.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, today: NaiveDate) -> Option<QuerySpec>;
}

/// [`Translator`] that asks a completion model for provider syntax.
pub struct CompletionTranslator {
    completion: Arc<dyn Completion>,
    renderer: PromptRenderer,
    timeout: Duration,
}

impl CompletionTranslator {
    #[must_use]
    pub fn new(completion: Arc<dyn Completion>, timeout: Duration) -> Self {
        Self {
            completion,
            renderer: PromptRenderer::new(),
            timeout,
        }
    }
}

impl std::fmt::Debug for CompletionTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionTranslator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Translator for CompletionTranslator {
    async fn translate(&self, text: &str, today: NaiveDate) -> Option<QuerySpec> {
        let prompt = match self.renderer.render_translation_prompt(text, today) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Failed to render translation prompt");
                return None;
            }
        };

        let response = match complete_within(
            self.completion.as_ref(),
            Some(TRANSLATION_SYSTEM),
            &prompt,
            self.timeout,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Translation completion failed");
                return None;
            }
        };

        debug!(response = %response.trim(), "Translation response");
        parse_lenient(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    struct Canned(Result<&'static str, ()>);

    #[async_trait]
    impl Completion for Canned {
        async fn complete(&self, system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
            assert_eq!(system, Some(TRANSLATION_SYSTEM));
            assert!(prompt.contains("rust cli tools"));
            self.0
                .map(str::to_string)
                .map_err(|()| LlmError::Completion("boom".to_string()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 18).unwrap()
    }

    fn translator(response: Result<&'static str, ()>) -> CompletionTranslator {
        CompletionTranslator::new(Arc::new(Canned(response)), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn translates_well_formed_response() {
        let spec = translator(Ok("language:rust topic:cli"))
            .translate("rust cli tools", today())
            .await
            .unwrap();

        assert_eq!(spec.to_query_string(), "language:rust topic:cli");
    }

    #[tokio::test]
    async fn prose_response_is_absent() {
        let spec = translator(Ok("Sorry, I can't do that."))
            .translate("rust cli tools", today())
            .await;

        assert!(spec.is_none());
    }

    #[tokio::test]
    async fn completion_failure_is_absent() {
        let spec = translator(Err(())).translate("rust cli tools", today()).await;

        assert!(spec.is_none());
    }
}
