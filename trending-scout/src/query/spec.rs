//! Structured search requests.

use super::{Qualifier, QueryError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Field the provider sorts results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    Stars,
    Forks,
    Updated,
    HelpWantedIssues,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortField::Stars => "stars",
            SortField::Forks => "forks",
            SortField::Updated => "updated",
            SortField::HelpWantedIssues => "help-wanted-issues",
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stars" => Ok(SortField::Stars),
            "forks" => Ok(SortField::Forks),
            "updated" => Ok(SortField::Updated),
            "help-wanted-issues" => Ok(SortField::HelpWantedIssues),
            _ => Err(QueryError::UnknownSortField(s.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One search request against the repository search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    /// Free-text search terms.
    pub terms: Vec<String>,

    /// Qualifier constraints, without duplicates.
    pub qualifiers: Vec<Qualifier>,

    /// Sort field; `None` means the provider's best-match order.
    pub sort: Option<SortField>,

    /// Sort direction.
    pub order: SortOrder,

    /// First page to request (1-based).
    pub page: u32,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            qualifiers: Vec::new(),
            sort: None,
            order: SortOrder::Desc,
            page: 1,
        }
    }
}

impl QuerySpec {
    /// Creates an empty spec starting at page 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a free-text term.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    /// Adds a qualifier unless an identical one is already present.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.push_qualifier(qualifier);
        self
    }

    /// Sets the sort field.
    #[must_use]
    pub fn sorted_by(mut self, sort: SortField) -> Self {
        self.sort = Some(sort);
        self
    }

    pub(crate) fn push_qualifier(&mut self, qualifier: Qualifier) {
        if !self.qualifiers.contains(&qualifier) {
            self.qualifiers.push(qualifier);
        }
    }

    /// Whether the spec has neither terms nor qualifiers. Such a spec
    /// renders an empty `q` parameter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.qualifiers.is_empty()
    }

    /// Whether a language filter is present.
    #[must_use]
    pub fn has_language(&self) -> bool {
        self.qualifiers
            .iter()
            .any(|q| matches!(q, Qualifier::Language(_)))
    }

    /// Returns a copy with every language filter removed.
    #[must_use]
    pub fn without_language(&self) -> Self {
        let mut relaxed = self.clone();
        relaxed
            .qualifiers
            .retain(|q| !matches!(q, Qualifier::Language(_)));
        relaxed
    }

    /// Renders the `q` parameter: terms first, then qualifiers.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.terms
            .iter()
            .cloned()
            .chain(self.qualifiers.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RangeExpr;

    #[test]
    fn renders_terms_before_qualifiers() {
        let spec = QuerySpec::new()
            .with_term("web")
            .with_qualifier(Qualifier::Language("rust".to_string()))
            .with_qualifier(Qualifier::Stars(RangeExpr::GreaterThan(100)));

        assert_eq!(spec.to_query_string(), "web language:rust stars:>100");
        assert_eq!(spec.page, 1);
        assert_eq!(spec.order, SortOrder::Desc);
    }

    #[test]
    fn ignores_duplicate_qualifiers() {
        let spec = QuerySpec::new()
            .with_qualifier(Qualifier::Topic("cli".to_string()))
            .with_qualifier(Qualifier::Topic("cli".to_string()));

        assert_eq!(spec.qualifiers.len(), 1);
    }

    #[test]
    fn can_drop_language_filter() {
        let spec = QuerySpec::new()
            .with_qualifier(Qualifier::Language("go".to_string()))
            .with_qualifier(Qualifier::Topic("cli".to_string()))
            .sorted_by(SortField::Stars);

        let relaxed = spec.without_language();

        assert!(spec.has_language());
        assert!(!relaxed.has_language());
        assert_eq!(relaxed.to_query_string(), "topic:cli");
        assert_eq!(relaxed.sort, Some(SortField::Stars));
        assert!(!relaxed.is_empty());
        assert!(QuerySpec::new()
            .with_qualifier(Qualifier::Language("go".to_string()))
            .without_language()
            .is_empty());
    }

    #[test]
    fn parses_sort_fields() {
        assert_eq!("Updated".parse::<SortField>().unwrap(), SortField::Updated);
        assert_eq!(
            "help-wanted-issues".parse::<SortField>().unwrap(),
            SortField::HelpWantedIssues
        );
        assert!("popularity".parse::<SortField>().is_err());
    }
}
