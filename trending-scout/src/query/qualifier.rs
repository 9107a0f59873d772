//! Search qualifiers in the provider's `key:value` syntax.

use super::range::RangeExpr;
use super::QueryError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// A single search constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    Language(String),
    Stars(RangeExpr<u64>),
    Forks(RangeExpr<u64>),
    /// Repository size in kilobytes.
    Size(RangeExpr<u64>),
    Created(RangeExpr<NaiveDate>),
    Pushed(RangeExpr<NaiveDate>),
    Topic(String),
    /// Number of topics.
    Topics(RangeExpr<u64>),
    User(String),
    Org(String),
    Repo(String),
    /// Fields to match terms against, e.g. `name,description`.
    In(String),
    License(String),
    Archived(bool),
    Is(String),
    GoodFirstIssues(RangeExpr<u64>),
    HelpWantedIssues(RangeExpr<u64>),
}

impl Qualifier {
    /// Qualifier key as written in the query string.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Qualifier::Language(_) => "language",
            Qualifier::Stars(_) => "stars",
            Qualifier::Forks(_) => "forks",
            Qualifier::Size(_) => "size",
            Qualifier::Created(_) => "created",
            Qualifier::Pushed(_) => "pushed",
            Qualifier::Topic(_) => "topic",
            Qualifier::Topics(_) => "topics",
            Qualifier::User(_) => "user",
            Qualifier::Org(_) => "org",
            Qualifier::Repo(_) => "repo",
            Qualifier::In(_) => "in",
            Qualifier::License(_) => "license",
            Qualifier::Archived(_) => "archived",
            Qualifier::Is(_) => "is",
            Qualifier::GoodFirstIssues(_) => "good-first-issues",
            Qualifier::HelpWantedIssues(_) => "help-wanted-issues",
        }
    }

    /// Whether `key` names a known qualifier.
    #[must_use]
    pub fn is_known_key(key: &str) -> bool {
        KNOWN_KEYS.contains(&key.to_ascii_lowercase().as_str())
    }
}

const KNOWN_KEYS: [&str; 17] = [
    "language",
    "stars",
    "forks",
    "size",
    "created",
    "pushed",
    "topic",
    "topics",
    "user",
    "org",
    "repo",
    "in",
    "license",
    "archived",
    "is",
    "good-first-issues",
    "help-wanted-issues",
];

impl FromStr for Qualifier {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || QueryError::InvalidQualifier(token.to_string());

        let (key, value) = token.split_once(':').ok_or_else(invalid)?;
        let value = value.trim().trim_matches('"').trim();
        if value.is_empty() {
            return Err(invalid());
        }

        let text = || -> Result<String, QueryError> { Ok(value.to_string()) };
        let count = |wrap: fn(RangeExpr<u64>) -> Qualifier| {
            RangeExpr::parse(value).map(wrap).ok_or_else(invalid)
        };
        let date = |wrap: fn(RangeExpr<NaiveDate>) -> Qualifier| {
            RangeExpr::parse(value).map(wrap).ok_or_else(invalid)
        };

        match key.trim().to_ascii_lowercase().as_str() {
            "language" => text().map(Qualifier::Language),
            "stars" => count(Qualifier::Stars),
            "forks" => count(Qualifier::Forks),
            "size" => count(Qualifier::Size),
            "created" => date(Qualifier::Created),
            "pushed" => date(Qualifier::Pushed),
            "topic" => text().map(Qualifier::Topic),
            "topics" => count(Qualifier::Topics),
            "user" => text().map(Qualifier::User),
            "org" => text().map(Qualifier::Org),
            "repo" => text().map(Qualifier::Repo),
            "in" => text().map(Qualifier::In),
            "license" => text().map(Qualifier::License),
            "archived" => match value.to_ascii_lowercase().as_str() {
                "true" => Ok(Qualifier::Archived(true)),
                "false" => Ok(Qualifier::Archived(false)),
                _ => Err(invalid()),
            },
            "is" => text().map(Qualifier::Is),
            "good-first-issues" => count(Qualifier::GoodFirstIssues),
            "help-wanted-issues" => count(Qualifier::HelpWantedIssues),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        match self {
            Qualifier::Language(v)
            | Qualifier::Topic(v)
            | Qualifier::User(v)
            | Qualifier::Org(v)
            | Qualifier::Repo(v)
            | Qualifier::In(v)
            | Qualifier::License(v)
            | Qualifier::Is(v) => {
                if v.chars().any(char::is_whitespace) {
                    write!(f, "{key}:\"{v}\"")
                } else {
                    write!(f, "{key}:{v}")
                }
            }
            Qualifier::Stars(r)
            | Qualifier::Forks(r)
            | Qualifier::Size(r)
            | Qualifier::Topics(r)
            | Qualifier::GoodFirstIssues(r)
            | Qualifier::HelpWantedIssues(r) => write!(f, "{key}:{r}"),
            Qualifier::Created(r) | Qualifier::Pushed(r) => write!(f, "{key}:{r}"),
            Qualifier::Archived(b) => write!(f, "{key}:{b}"),
        }
    }
}
