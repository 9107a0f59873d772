//! GitHub search backend built on octocrab.

use super::{BackendError, SearchBackend, SearchPage};
use crate::query::QuerySpec;
use crate::rate_limit::{epoch_to_utc, reset_from_headers, RateLimitInfo};
use crate::repository::split_full_name;
use async_trait::async_trait;
use http::header::LINK;
use http::HeaderMap;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

/// The search API never returns more than this many results per query.
pub const SEARCH_RESULT_WINDOW: u64 = 1000;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    #[serde(default)]
    incomplete_results: bool,
    #[serde(default)]
    items: Vec<Value>,
}

/// [`SearchBackend`] talking to the GitHub REST API.
///
/// Octocrab's own retry middleware is disabled; retries are the caller's
/// decision.
#[derive(Debug, Clone)]
pub struct OctocrabBackend {
    octocrab: Octocrab,
}

impl OctocrabBackend {
    /// Builds a client, authenticated when `token` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(token: Option<String>) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None);
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        Ok(Self {
            octocrab: builder.build()?,
        })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    /// Issues a GET and returns headers and body of a successful response.
    async fn get(&self, route: String) -> Result<(HeaderMap, String), BackendError> {
        let response = self
            .octocrab
            ._get(route)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = self
            .octocrab
            .body_to_string(response)
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                code: status.as_u16(),
                reset_at: reset_from_headers(&headers),
                message: error_message(&body),
            });
        }

        Ok((headers, body))
    }
}

#[async_trait]
impl SearchBackend for OctocrabBackend {
    async fn search(
        &self,
        query: &QuerySpec,
        page: u32,
        per_page: u8,
    ) -> Result<SearchPage, BackendError> {
        let route = format!("/search/repositories?{}", search_params(query, page, per_page));
        debug!(%route, "Searching repositories");

        let (headers, body) = self.get(route).await?;
        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))?;

        let has_next = has_next_link(&headers).unwrap_or_else(|| {
            u64::from(page) * u64::from(per_page)
                < response.total_count.min(SEARCH_RESULT_WINDOW)
        });

        Ok(SearchPage {
            total_count: response.total_count,
            incomplete_results: response.incomplete_results,
            items: response.items,
            has_next,
            rate_limit: RateLimitInfo::from_headers(&headers),
        })
    }

    async fn repository(&self, full_name: &str) -> Result<Value, BackendError> {
        let (owner, name) = split_full_name(full_name)
            .ok_or_else(|| BackendError::Decode(format!("invalid repository '{full_name}'")))?;
        let (_, body) = self.get(format!("/repos/{owner}/{name}")).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn rate_limit(&self) -> Result<RateLimitInfo, BackendError> {
        let rate_limit = self
            .octocrab
            .ratelimit()
            .get()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let search = &rate_limit.resources.search;

        Ok(RateLimitInfo {
            remaining: u32::try_from(search.remaining).unwrap_or(u32::MAX),
            reset: epoch_to_utc(search.reset)
                .ok_or_else(|| BackendError::Decode("invalid reset epoch".to_string()))?,
            limit: u32::try_from(search.limit).unwrap_or(u32::MAX),
        })
    }
}

/// Encodes the query string for `/search/repositories`.
fn search_params(query: &QuerySpec, page: u32, per_page: u8) -> String {
    let mut params = form_urlencoded::Serializer::new(String::new());
    params.append_pair("q", &query.to_query_string());
    if let Some(sort) = query.sort {
        params.append_pair("sort", sort.as_str());
        params.append_pair("order", query.order.as_str());
    }
    params.append_pair("per_page", &per_page.to_string());
    params.append_pair("page", &page.to_string());
    params.finish()
}

/// Reads `rel="next"` from the `Link` header. `None` when the header is
/// absent.
fn has_next_link(headers: &HeaderMap) -> Option<bool> {
    let link = headers.get(LINK)?.to_str().ok()?;
    Some(link.split(',').any(|part| part.contains("rel=\"next\"")))
}

/// Extracts the provider's `message` field, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
