//! Fixed discovery categories and their query templates.

use super::{Qualifier, QueryError, QuerySpec, RangeExpr, SortField};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A predefined discovery category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    NewlyCreated,
    RecentlyActive,
    BreakingOut,
    HiddenGems,
    HotTopics,
    AiMl,
    WebDev,
    DevOps,
    Mobile,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 9] = [
        Category::NewlyCreated,
        Category::RecentlyActive,
        Category::BreakingOut,
        Category::HiddenGems,
        Category::HotTopics,
        Category::AiMl,
        Category::WebDev,
        Category::DevOps,
        Category::Mobile,
    ];

    /// Kebab-case name used on the command line and as result origin.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Category::NewlyCreated => "newly-created",
            Category::RecentlyActive => "recently-active",
            Category::BreakingOut => "breaking-out",
            Category::HiddenGems => "hidden-gems",
            Category::HotTopics => "hot-topics",
            Category::AiMl => "ai-ml",
            Category::WebDev => "web-dev",
            Category::DevOps => "dev-ops",
            Category::Mobile => "mobile",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::NewlyCreated => "Newly Created",
            Category::RecentlyActive => "Recently Active",
            Category::BreakingOut => "Breaking Out",
            Category::HiddenGems => "Hidden Gems",
            Category::HotTopics => "Hot Topics",
            Category::AiMl => "AI/ML",
            Category::WebDev => "Web Development",
            Category::DevOps => "DevOps",
            Category::Mobile => "Mobile",
        }
    }

    /// Builds the category's query for repositories newer than `threshold`.
    #[must_use]
    pub fn template(self, threshold: NaiveDate) -> QuerySpec {
        let since = RangeExpr::GreaterThan(threshold);
        let created = Qualifier::Created(since);
        let topic = |name: &str| Qualifier::Topic(name.to_string());

        match self {
            Category::NewlyCreated => QuerySpec::new()
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::RecentlyActive => QuerySpec::new()
                .with_qualifier(Qualifier::Pushed(since))
                .with_qualifier(Qualifier::Stars(RangeExpr::GreaterThan(10)))
                .sorted_by(SortField::Updated),
            Category::BreakingOut => QuerySpec::new()
                .with_qualifier(Qualifier::Stars(RangeExpr::Between(100, 999)))
                .with_qualifier(created)
                .sorted_by(SortField::Updated),
            Category::HiddenGems => QuerySpec::new()
                .with_qualifier(Qualifier::Stars(RangeExpr::Between(10, 100)))
                .with_qualifier(Qualifier::Forks(RangeExpr::GreaterThan(5)))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::HotTopics => QuerySpec::new()
                .with_qualifier(Qualifier::GoodFirstIssues(RangeExpr::GreaterThan(0)))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::AiMl => QuerySpec::new()
                .with_qualifier(topic("machine-learning"))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::WebDev => QuerySpec::new()
                .with_qualifier(topic("react"))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::DevOps => QuerySpec::new()
                .with_qualifier(topic("docker"))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
            Category::Mobile => QuerySpec::new()
                .with_qualifier(topic("android"))
                .with_qualifier(created)
                .sorted_by(SortField::Stars),
        }
    }
}

impl FromStr for Category {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| QueryError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 11).unwrap()
    }

    #[test]
    fn breaking_out_uses_star_band_and_updated_sort() {
        let spec = Category::BreakingOut.template(threshold());

        assert_eq!(spec.to_query_string(), "stars:100..999 created:>2025-10-11");
        assert_eq!(spec.sort, Some(SortField::Updated));
    }

    #[test]
    fn hidden_gems_template() {
        assert_eq!(
            Category::HiddenGems.template(threshold()).to_query_string(),
            "stars:10..100 forks:>5 created:>2025-10-11"
        );
    }

    #[test]
    fn recently_active_filters_on_push_date() {
        let spec = Category::RecentlyActive.template(threshold());

        assert_eq!(spec.to_query_string(), "pushed:>2025-10-11 stars:>10");
        assert_eq!(spec.sort, Some(SortField::Updated));
    }

    #[test]
    fn every_category_round_trips_by_name() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
            assert!(!category.template(threshold()).qualifiers.is_empty());
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert_eq!(
            "quantum".parse::<Category>().unwrap_err(),
            QueryError::UnknownCategory("quantum".to_string())
        );
        assert_eq!("AI_ML".parse::<Category>().unwrap(), Category::AiMl);
    }
}
