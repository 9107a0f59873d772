//! The discovery engine.
//!
//! [`Scout`] wires the components together: it builds queries, fetches them
//! concurrently under the shared quota, aggregates and ranks the results,
//! and analyzes single repositories on demand.

mod config;
mod error;

pub use config::ScoutConfig;
pub use error::ScoutError;

use crate::analysis::{AnalysisError, AnalysisReport, Analyzer};
use crate::config::ScoutConfigFile;
use crate::fetch::{FetchError, Fetcher, OctocrabBackend, QueryFetch, SearchBackend};
use crate::llm::{Completion, LlmError, ModelCompletion};
use crate::query::{CompletionTranslator, QueryBuilder, SpecInput, Translator};
use crate::rate_limit::{QuotaLedger, RateLimitInfo, ANONYMOUS_QUOTA, AUTHENTICATED_QUOTA};
use crate::ranking::{aggregate, RankedResultSet};
use crate::repository::{split_full_name, RepositorySummary};
use crate::scoring::Scorer;
use crate::summary::{DiscoverySummary, QueryOutcome};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};

/// Ranked results of one discovery run plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub results: RankedResultSet,
    pub summary: DiscoverySummary,
}

/// Discovers, ranks and analyzes repositories.
pub struct Scout {
    fetcher: Fetcher,
    builder: QueryBuilder,
    scorer: Scorer,
    analyzer: Option<Analyzer>,
    concurrency: usize,
}

impl std::fmt::Debug for Scout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scout")
            .field("fetcher", &self.fetcher)
            .field("analysis", &self.analyzer.is_some())
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Scout {
    /// Builds an engine backed by the GitHub API.
    ///
    /// A missing completion model is not an error: natural-language requests
    /// then fall back to free-text search and analysis is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError`] if the config file is invalid, the HTTP client
    /// cannot be built, or a configured model cannot be constructed.
    pub fn new(config: ScoutConfig) -> Result<Self, ScoutError> {
        let mut file = ScoutConfigFile::load_or_default(config.config_path())?;
        if let Some(concurrency) = config.concurrency() {
            file.search.concurrency = concurrency;
        }
        if let Some(max_results) = config.max_results() {
            file.search.max_results = max_results;
        }

        let backend = OctocrabBackend::new(config.token().map(str::to_owned))?;
        let default_quota = if config.token().is_some() {
            AUTHENTICATED_QUOTA
        } else {
            ANONYMOUS_QUOTA
        };
        let ledger = Arc::new(QuotaLedger::with_limit(
            file.search.initial_quota.unwrap_or(default_quota),
        ));

        let completion: Option<Arc<dyn Completion>> =
            match ModelCompletion::from_config(file.llm.as_ref()) {
                Ok(completion) => Some(Arc::new(completion)),
                Err(LlmError::MissingModel) => {
                    info!("No completion model configured; translation and analysis disabled");
                    None
                }
                Err(e) => return Err(e.into()),
            };

        Ok(Self::with_parts(Arc::new(backend), completion, &file, ledger))
    }

    /// Builds an engine from explicit parts.
    #[must_use]
    pub fn with_parts(
        backend: Arc<dyn SearchBackend>,
        completion: Option<Arc<dyn Completion>>,
        file: &ScoutConfigFile,
        ledger: Arc<QuotaLedger>,
    ) -> Self {
        let timeout = Duration::from_secs(file.analysis.timeout_secs);
        let translator = completion.clone().map(|completion| {
            Arc::new(CompletionTranslator::new(completion, timeout)) as Arc<dyn Translator>
        });

        Self {
            fetcher: Fetcher::new(backend, ledger)
                .with_per_page(file.search.per_page)
                .with_max_results(file.search.max_results),
            builder: QueryBuilder::new(translator),
            scorer: Scorer::new(&file.scoring),
            analyzer: completion.map(|completion| Analyzer::new(completion, timeout)),
            concurrency: file.search.concurrency.max(1),
        }
    }

    /// The scorer used for ranking.
    #[must_use]
    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Whether a completion model is available for analysis.
    #[must_use]
    pub fn can_analyze(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Runs a discovery request at the current time.
    ///
    /// # Errors
    ///
    /// See [`Scout::discover_at`].
    pub async fn discover(&self, input: &SpecInput) -> Result<Discovery, ScoutError> {
        self.discover_at(input, Utc::now()).await
    }

    /// Runs a discovery request, scoring against `now`.
    ///
    /// Queries are fetched concurrently. A query that fails part-way keeps
    /// its earlier pages; the failure is recorded in the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Query`] for an invalid request, and
    /// [`ScoutError::Fetch`] only when every query failed before returning a
    /// single page.
    pub async fn discover_at(
        &self,
        input: &SpecInput,
        now: DateTime<Utc>,
    ) -> Result<Discovery, ScoutError> {
        let span = info_span!("discover", request = ?input);
        async {
            let built = self.builder.build(input, now).await?;
            info!(queries = built.queries.len(), "Built queries");

            let fetches: Vec<QueryFetch> = stream::iter(&built.queries)
                .map(|planned| self.fetcher.fetch(planned))
                .buffered(self.concurrency)
                .collect()
                .await;

            let mut summary = DiscoverySummary::new(built.translation_fallback);
            for fetch in &fetches {
                summary.record_outcome(QueryOutcome::from_fetch(fetch));
            }

            if summary.all_failed() {
                if let Some(error) = first_failure(&summary) {
                    warn!(error = %error, "Every query failed");
                    return Err(error.into());
                }
            }

            let aggregation = aggregate(&fetches, now, &self.scorer);
            summary.records_skipped = aggregation.skipped;
            summary.duplicates_collapsed = aggregation.duplicates;

            info!(
                results = aggregation.results.len(),
                skipped = aggregation.skipped,
                duplicates = aggregation.duplicates,
                partial = summary.has_failures(),
                "Discovery finished"
            );

            Ok(Discovery {
                results: aggregation.results,
                summary,
            })
        }
        .instrument(span)
        .await
    }

    /// Fetches the current record of `identifier` and analyzes it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidIdentifier`] for identifiers not in
    /// owner/name form, [`AnalysisError::CompletionUnavailable`] without a
    /// model, and fetch, decode or completion failures otherwise.
    pub async fn analyze(&self, identifier: &str) -> Result<AnalysisReport, AnalysisError> {
        let identifier = identifier.trim();
        if split_full_name(identifier).is_none() {
            return Err(AnalysisError::InvalidIdentifier(identifier.to_string()));
        }
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or(AnalysisError::CompletionUnavailable)?;

        let record = self.fetcher.repository(identifier).await?;
        let repository = RepositorySummary::from_record(&record)?;
        analyzer.analyze(&repository).await
    }

    /// Analyzes an already fetched repository without spending quota.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::CompletionUnavailable`] without a model, or
    /// the completion failure.
    pub async fn analyze_repository(
        &self,
        repository: &RepositorySummary,
    ) -> Result<AnalysisReport, AnalysisError> {
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or(AnalysisError::CompletionUnavailable)?;
        analyzer.analyze(repository).await
    }

    /// Remaining search requests and when the window resets.
    #[must_use]
    pub fn remaining_quota(&self) -> (u32, DateTime<Utc>) {
        let info = self.fetcher.ledger().snapshot();
        (info.remaining, info.reset)
    }

    /// Re-reads the quota from the provider.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Upstream`] if the rate-limit endpoint fails.
    pub async fn refresh_quota(&self) -> Result<RateLimitInfo, FetchError> {
        self.fetcher.refresh_quota().await
    }
}

/// Prefers a rate-limit failure, since it tells the caller when to retry.
fn first_failure(summary: &DiscoverySummary) -> Option<FetchError> {
    summary
        .failures()
        .find(|e| e.is_rate_limited())
        .or_else(|| summary.failures().next())
        .cloned()
}
