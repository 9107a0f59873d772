//! Repository analysis through the text-completion capability.
//!
//! One prompt per repository requests five fixed sections; the response is
//! split back into an [`AnalysisReport`]. A section the model left out is
//! marked as not available. Only a failed or timed-out completion call fails
//! the whole analysis.

mod error;
mod report;

pub use error::AnalysisError;
pub use report::{AnalysisReport, Section, SectionText, NOT_AVAILABLE};

use crate::fetch::UpstreamCause;
use crate::llm::{complete_within, Completion};
use crate::prompts::{PromptRenderer, ANALYSIS_SYSTEM};
use crate::repository::RepositorySummary;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Formats analysis prompts and parses the responses.
pub struct Analyzer {
    completion: Arc<dyn Completion>,
    renderer: PromptRenderer,
    timeout: Duration,
}

impl Analyzer {
    /// Creates an analyzer bounding every completion call by `timeout`.
    #[must_use]
    pub fn new(completion: Arc<dyn Completion>, timeout: Duration) -> Self {
        Self {
            completion,
            renderer: PromptRenderer::new(),
            timeout,
        }
    }

    /// Renders the analysis prompt for `repo` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Prompt`] if rendering fails.
    pub fn build_prompt(&self, repo: &RepositorySummary) -> Result<String, AnalysisError> {
        Ok(self.renderer.render_analysis_prompt(repo)?)
    }

    /// Analyzes a single repository.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Upstream`] if the completion call errors or
    /// exceeds the deadline, or [`AnalysisError::Prompt`] if rendering fails.
    pub async fn analyze(&self, repo: &RepositorySummary) -> Result<AnalysisReport, AnalysisError> {
        let span = info_span!("analyze", repo = %repo.full_name);
        async {
            let prompt = self.build_prompt(repo)?;
            debug!(prompt_len = prompt.len(), "Rendered analysis prompt");

            let response = complete_within(
                self.completion.as_ref(),
                Some(ANALYSIS_SYSTEM),
                &prompt,
                self.timeout,
            )
            .await
            .map_err(|e| AnalysisError::Upstream {
                repository: repo.full_name.clone(),
                cause: UpstreamCause::from_completion(&e, self.timeout),
            })?;

            let report = AnalysisReport::parse(&repo.full_name, &response);
            let missing = report.missing();
            if missing.is_empty() {
                info!("Analysis complete");
            } else {
                warn!(missing = ?missing, "Analysis response lacked sections");
            }
            Ok(report)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct Canned(&'static str);

    #[async_trait]
    impl Completion for Canned {
        async fn complete(&self, _: Option<&str>, _: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Completion for Failing {
        async fn complete(&self, _: Option<&str>, _: &str) -> Result<String, LlmError> {
            Err(LlmError::Completion("provider unavailable".to_string()))
        }
    }

    struct Stalled;

    #[async_trait]
    impl Completion for Stalled {
        async fn complete(&self, _: Option<&str>, _: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn repo() -> RepositorySummary {
        let created = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        RepositorySummary {
            full_name: "octo/widgets".to_string(),
            stars: 10,
            forks: 1,
            watchers: 10,
            open_issues: 0,
            language: Some("Rust".to_string()),
            topics: Vec::new(),
            created_at: created,
            pushed_at: created,
            has_wiki: false,
            description: None,
            html_url: "https://github.com/octo/widgets".to_string(),
            license: None,
        }
    }

    fn analyzer(completion: impl Completion + 'static) -> Analyzer {
        Analyzer::new(Arc::new(completion), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn partial_response_yields_partial_report() {
        let report = analyzer(Canned("## Repository Overview\nWidgets.\n"))
            .analyze(&repo())
            .await
            .unwrap();

        assert_eq!(report.repository, "octo/widgets");
        assert_eq!(report.section(Section::Overview).as_str(), "Widgets.");
        assert_eq!(report.missing().len(), 4);
    }

    #[tokio::test]
    async fn completion_error_is_upstream() {
        let err = analyzer(Failing).analyze(&repo()).await.unwrap_err();

        match err {
            AnalysisError::Upstream { repository, cause } => {
                assert_eq!(repository, "octo/widgets");
                assert!(matches!(cause, UpstreamCause::Completion(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_surfaces_as_upstream_timeout() {
        let err = analyzer(Stalled).analyze(&repo()).await.unwrap_err();

        assert!(matches!(
            err,
            AnalysisError::Upstream {
                cause: UpstreamCause::TimedOut(d),
                ..
            } if d == Duration::from_millis(50)
        ));
    }
}
