//! Repository snapshots returned by the search API.
//!
//! Records arrive as raw JSON and are decoded one at a time, so a single
//! malformed record never poisons the rest of a page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An immutable snapshot of a repository as reported by the search API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySummary {
    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Stargazer count.
    pub stars: i64,

    /// Fork count.
    pub forks: i64,

    /// Watcher count.
    pub watchers: i64,

    /// Open issue count.
    pub open_issues: i64,

    /// Primary language, if the provider detected one.
    pub language: Option<String>,

    /// Repository topics (possibly empty).
    pub topics: Vec<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last push timestamp.
    pub pushed_at: DateTime<Utc>,

    /// Whether the wiki is enabled.
    pub has_wiki: bool,

    /// Repository description.
    pub description: Option<String>,

    /// Browser URL of the repository.
    pub html_url: String,

    /// License name, when one is detected.
    pub license: Option<String>,
}

/// A record that could not be decoded into a [`RepositorySummary`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed repository record{}: {reason}", name_suffix(.full_name.as_deref()))]
pub struct MalformedRecord {
    /// Full name of the record, when it could be read.
    pub full_name: Option<String>,

    /// Why decoding failed.
    pub reason: String,
}

fn name_suffix(full_name: Option<&str>) -> String {
    full_name.map(|n| format!(" '{n}'")).unwrap_or_default()
}

/// Wire shape of a repository record. Everything is optional so that
/// missing fields surface as [`MalformedRecord`] instead of a decode panic.
#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: Option<String>,
    stargazers_count: Option<i64>,
    forks_count: Option<i64>,
    watchers_count: Option<i64>,
    open_issues_count: Option<i64>,
    language: Option<String>,
    #[serde(default)]
    topics: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
    has_wiki: Option<bool>,
    description: Option<String>,
    html_url: Option<String>,
    license: Option<RawLicense>,
}

#[derive(Debug, Deserialize)]
struct RawLicense {
    name: Option<String>,
}

impl RepositorySummary {
    /// Decodes a single raw search record.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRecord`] if the record is not an object, fails to
    /// deserialize, or lacks a required field.
    pub fn from_record(record: &Value) -> Result<Self, MalformedRecord> {
        let name_hint = record
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let raw: RawRepository =
            serde_json::from_value(record.clone()).map_err(|e| MalformedRecord {
                full_name: name_hint.clone(),
                reason: e.to_string(),
            })?;

        let missing = |field: &str| MalformedRecord {
            full_name: name_hint.clone(),
            reason: format!("missing required field '{field}'"),
        };

        let full_name = raw.full_name.ok_or_else(|| missing("full_name"))?;
        if split_full_name(&full_name).is_none() {
            return Err(MalformedRecord {
                full_name: Some(full_name),
                reason: "full_name is not in owner/name format".to_string(),
            });
        }

        let created_at = raw.created_at.ok_or_else(|| missing("created_at"))?;
        let html_url = raw
            .html_url
            .unwrap_or_else(|| format!("https://github.com/{full_name}"));

        Ok(Self {
            stars: raw.stargazers_count.ok_or_else(|| missing("stargazers_count"))?,
            forks: raw.forks_count.ok_or_else(|| missing("forks_count"))?,
            watchers: raw.watchers_count.ok_or_else(|| missing("watchers_count"))?,
            open_issues: raw
                .open_issues_count
                .ok_or_else(|| missing("open_issues_count"))?,
            language: raw.language.filter(|l| !l.trim().is_empty()),
            topics: raw.topics.unwrap_or_default(),
            created_at,
            // Never-pushed repositories report null here.
            pushed_at: raw.pushed_at.unwrap_or(created_at),
            has_wiki: raw.has_wiki.unwrap_or(false),
            description: raw.description.filter(|d| !d.trim().is_empty()),
            html_url,
            license: raw.license.and_then(|l| l.name),
            full_name,
        })
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        split_full_name(&self.full_name).map_or("", |(owner, _)| owner)
    }

    /// Repository name without the owner.
    pub fn name(&self) -> &str {
        split_full_name(&self.full_name).map_or("", |(_, name)| name)
    }
}

/// Splits an "owner/name" identifier into its two non-empty halves.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}
