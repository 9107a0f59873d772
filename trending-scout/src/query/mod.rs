//! Query building.
//!
//! Turns a [`SpecInput`] into one or more [`QuerySpec`]s:
//!
//! - a category plus lookback window maps to one deterministic template
//! - natural-language text goes through a [`Translator`]; a translation that
//!   carries a language filter yields a strict and a relaxed variant, and a
//!   failed translation falls back to searching for the text itself
//! - raw provider syntax is parsed directly

mod category;
mod error;
mod parse;
mod qualifier;
mod range;
mod spec;
mod translate;

pub use category::Category;
pub use error::QueryError;
pub use parse::{parse_lenient, parse_raw};
pub use qualifier::Qualifier;
pub use range::{RangeExpr, RangeValue};
pub use spec::{QuerySpec, SortField, SortOrder};
pub use translate::{CompletionTranslator, Translator};

use chrono::{DateTime, Duration, Utc};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, warn};

/// Accepted lookback windows, in days.
pub const LOOKBACK_DAYS: RangeInclusive<u32> = 1..=30;

/// Origin label for the strict natural-language variant.
pub const ORIGIN_NATURAL: &str = "natural-language";

/// Origin label for the natural-language variant without a language filter.
pub const ORIGIN_NATURAL_RELAXED: &str = "natural-language (any language)";

/// Origin label for the free-text fallback.
pub const ORIGIN_FREE_TEXT: &str = "free-text";

/// Origin label for raw provider syntax.
pub const ORIGIN_RAW: &str = "raw";

/// A discovery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecInput {
    /// A fixed category over the last `lookback_days` days.
    Category {
        category: Category,
        lookback_days: u32,
    },

    /// Free-form natural language, translated by the completion model.
    NaturalLanguage {
        text: String,
        sort: Option<SortField>,
    },

    /// Provider query syntax, used as written.
    Raw {
        text: String,
        sort: Option<SortField>,
    },
}

impl SpecInput {
    #[must_use]
    pub fn category(category: Category, lookback_days: u32) -> Self {
        Self::Category {
            category,
            lookback_days,
        }
    }

    #[must_use]
    pub fn natural(text: impl Into<String>) -> Self {
        Self::NaturalLanguage {
            text: text.into(),
            sort: None,
        }
    }

    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw {
            text: text.into(),
            sort: None,
        }
    }
}

/// A query paired with a label describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub spec: QuerySpec,
    pub origin: String,
}

impl PlannedQuery {
    fn new(spec: QuerySpec, origin: impl Into<String>) -> Self {
        Self {
            spec,
            origin: origin.into(),
        }
    }
}

/// Output of [`QueryBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQueries {
    pub queries: Vec<PlannedQuery>,

    /// Whether natural-language translation degraded to free-text search.
    pub translation_fallback: bool,
}

/// Builds query specifications from discovery requests.
#[derive(Clone, Default)]
pub struct QueryBuilder {
    translator: Option<Arc<dyn Translator>>,
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("translator", &self.translator.is_some())
            .finish()
    }
}

impl QueryBuilder {
    /// Creates a builder. Without a translator every natural-language
    /// request falls back to free-text search.
    #[must_use]
    pub fn new(translator: Option<Arc<dyn Translator>>) -> Self {
        Self { translator }
    }

    /// Builds the queries for `input`, evaluating dates against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidLookback`] for a lookback outside 1-30
    /// days and [`QueryError::EmptyQuery`] for blank text. Translation
    /// failures never error.
    pub async fn build(
        &self,
        input: &SpecInput,
        now: DateTime<Utc>,
    ) -> Result<BuiltQueries, QueryError> {
        match input {
            SpecInput::Category {
                category,
                lookback_days,
            } => Ok(BuiltQueries {
                queries: vec![PlannedQuery::new(
                    category_spec(*category, *lookback_days, now)?,
                    category.name(),
                )],
                translation_fallback: false,
            }),
            SpecInput::NaturalLanguage { text, sort } => {
                if text.trim().is_empty() {
                    return Err(QueryError::EmptyQuery);
                }
                Ok(self.build_natural(text, *sort, now).await)
            }
            SpecInput::Raw { text, sort } => {
                if text.trim().is_empty() {
                    return Err(QueryError::EmptyQuery);
                }
                let mut spec = parse_raw(text);
                if sort.is_some() {
                    spec.sort = *sort;
                }
                Ok(BuiltQueries {
                    queries: vec![PlannedQuery::new(spec, ORIGIN_RAW)],
                    translation_fallback: false,
                })
            }
        }
    }

    async fn build_natural(
        &self,
        text: &str,
        sort: Option<SortField>,
        now: DateTime<Utc>,
    ) -> BuiltQueries {
        let translated = match &self.translator {
            Some(translator) => translator.translate(text, now.date_naive()).await,
            None => None,
        };

        let Some(mut spec) = translated.filter(|spec| !spec.is_empty()) else {
            warn!(text, "Translation fell back to free-text search");
            let mut fallback = QuerySpec::new().with_term(text);
            fallback.sort = sort;
            return BuiltQueries {
                queries: vec![PlannedQuery::new(fallback, ORIGIN_FREE_TEXT)],
                translation_fallback: true,
            };
        };

        if sort.is_some() {
            spec.sort = sort;
        }
        debug!(query = %spec, "Translated natural-language request");

        let mut queries = Vec::with_capacity(2);
        let relaxed = spec
            .has_language()
            .then(|| spec.without_language())
            .filter(|relaxed| !relaxed.is_empty());
        queries.push(PlannedQuery::new(spec, ORIGIN_NATURAL));
        if let Some(relaxed) = relaxed {
            queries.push(PlannedQuery::new(relaxed, ORIGIN_NATURAL_RELAXED));
        }

        BuiltQueries {
            queries,
            translation_fallback: false,
        }
    }
}

/// Builds a category template for the window ending at `now`.
///
/// # Errors
///
/// Returns [`QueryError::InvalidLookback`] if `lookback_days` is not 1-30.
pub fn category_spec(
    category: Category,
    lookback_days: u32,
    now: DateTime<Utc>,
) -> Result<QuerySpec, QueryError> {
    if !LOOKBACK_DAYS.contains(&lookback_days) {
        return Err(QueryError::InvalidLookback(lookback_days));
    }
    let threshold = (now - Duration::days(i64::from(lookback_days))).date_naive();
    Ok(category.template(threshold))
}
