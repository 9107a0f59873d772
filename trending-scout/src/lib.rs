#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod analysis;
pub mod config;
pub mod content;
pub mod fetch;
pub mod llm;
pub mod prompts;
pub mod query;
pub mod ranking;
pub mod rate_limit;
pub mod repository;
pub mod retry;
pub mod scoring;
pub mod scout;
pub mod summary;

pub use analysis::{AnalysisError, AnalysisReport, Analyzer, Section, SectionText};
pub use config::{ConfigError, ScoutConfigFile};
pub use content::{ContentKind, ContentProfile};
pub use fetch::{
    BackendError, FetchError, Fetcher, OctocrabBackend, QueryFetch, SearchBackend, SearchPage,
    UpstreamCause,
};
pub use llm::{Completion, LlmConfig, LlmError, ModelCompletion, Provider};
pub use query::{
    Category, QueryBuilder, QueryError, QuerySpec, SortField, SortOrder, SpecInput, Translator,
};
pub use ranking::{aggregate, RankedResultSet, ScoredRepository};
pub use rate_limit::{QuotaLedger, RateLimitInfo};
pub use repository::{MalformedRecord, RepositorySummary};
pub use retry::Backoff;
pub use scoring::{ScoreBreakdown, Scorer, ScoringConfig};
pub use scout::{Discovery, Scout, ScoutConfig, ScoutError};
pub use summary::{DiscoverySummary, QueryOutcome};
