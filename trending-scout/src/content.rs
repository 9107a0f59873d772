//! Content-planning heuristics for discovered repositories.

use crate::prompts::group_thousands;
use crate::repository::RepositorySummary;
use crate::scoring::age_days;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

const BASE_TAGS: [&str; 5] = ["github", "programming", "coding", "opensource", "developer"];
const MAX_TAGS: usize = 10;
const TOPIC_TAGS: usize = 5;

/// Kind of video or episode a repository suits best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    PopularSpotlight,
    RisingStar,
    HiddenGem,
    AiToolReview,
    DeepDive,
}

impl ContentKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ContentKind::PopularSpotlight => "Popular Repository Spotlight",
            ContentKind::RisingStar => "Rising Star Analysis",
            ContentKind::HiddenGem => "Hidden Gem Discovery",
            ContentKind::AiToolReview => "AI Tool Review",
            ContentKind::DeepDive => "Repository Deep Dive",
        }
    }

    /// First matching rule wins: very popular, young and growing, forked
    /// more than starred, AI-related, otherwise a deep dive.
    #[must_use]
    pub fn for_repository(repo: &RepositorySummary, now: DateTime<Utc>) -> Self {
        let describes_ai = repo.description.as_deref().is_some_and(|d| {
            d.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .any(|w| w == "ai")
        });

        if repo.stars > 10_000 {
            ContentKind::PopularSpotlight
        } else if age_days(repo.created_at, now) < 30 && repo.stars > 100 {
            ContentKind::RisingStar
        } else if repo.stars < 1000 && repo.forks > 50 {
            ContentKind::HiddenGem
        } else if describes_ai || has_topic(repo, &["machine-learning"]) {
            ContentKind::AiToolReview
        } else {
            ContentKind::DeepDive
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Audience a repository's content should target.
#[must_use]
pub fn target_audience(repo: &RepositorySummary) -> &'static str {
    let language = repo.language.as_deref().unwrap_or_default().to_lowercase();

    if has_topic(repo, &["machine-learning", "ai"]) {
        "AI/ML Engineers, Data Scientists"
    } else if matches!(language.as_str(), "javascript" | "typescript") {
        "Frontend Developers, Full-stack Engineers"
    } else if language == "python" {
        "Python Developers, Backend Engineers"
    } else if has_topic(repo, &["devops"]) || matches!(language.as_str(), "dockerfile" | "hcl") {
        "DevOps Engineers, System Administrators"
    } else {
        "General Developers, Programming Enthusiasts"
    }
}

/// Content plan for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentProfile {
    pub kind: ContentKind,
    pub audience: &'static str,
    pub tags: Vec<String>,
    pub titles: Vec<String>,
}

impl ContentProfile {
    /// Derives the content plan for `repo` at `now`.
    #[must_use]
    pub fn for_repository(repo: &RepositorySummary, now: DateTime<Utc>) -> Self {
        Self {
            kind: ContentKind::for_repository(repo, now),
            audience: target_audience(repo),
            tags: tags(repo),
            titles: titles(repo),
        }
    }
}

fn tags(repo: &RepositorySummary) -> Vec<String> {
    let mut tags: Vec<String> = BASE_TAGS.iter().map(|t| (*t).to_string()).collect();
    if let Some(language) = &repo.language {
        tags.push(language.to_lowercase());
    }
    tags.extend(repo.topics.iter().take(TOPIC_TAGS).cloned());
    tags.dedup();
    tags.truncate(MAX_TAGS);
    tags
}

fn titles(repo: &RepositorySummary) -> Vec<String> {
    let language = repo.language.as_deref().unwrap_or("GitHub");
    let stars = group_thousands(repo.stars);
    let name = repo.name();

    vec![
        format!("This {language} Repository Has {stars} Stars - Here's Why"),
        format!("{name}: The Tool Every Developer Needs to Know About"),
        format!("I Found This Amazing {language} Project With {stars} Stars"),
        format!("Why {name} is Trending on GitHub Right Now"),
        format!("{name} Review: Worth the Hype? ({stars} Stars)"),
    ]
}

fn has_topic(repo: &RepositorySummary, wanted: &[&str]) -> bool {
    repo.topics
        .iter()
        .any(|t| wanted.iter().any(|w| t.eq_ignore_ascii_case(w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, 0, 0, 0).unwrap()
    }

    fn repo() -> RepositorySummary {
        RepositorySummary {
            full_name: "octo/widgets".to_string(),
            stars: 500,
            forks: 10,
            watchers: 500,
            open_issues: 0,
            language: Some("Rust".to_string()),
            topics: Vec::new(),
            created_at: now() - Duration::days(200),
            pushed_at: now(),
            has_wiki: false,
            description: None,
            html_url: String::new(),
            license: None,
        }
    }

    #[test]
    fn classifies_content_kind() {
        let mut r = repo();
        assert_eq!(ContentKind::for_repository(&r, now()), ContentKind::DeepDive);

        r.forks = 60;
        assert_eq!(ContentKind::for_repository(&r, now()), ContentKind::HiddenGem);

        r.created_at = now() - Duration::days(10);
        assert_eq!(ContentKind::for_repository(&r, now()), ContentKind::RisingStar);

        r.stars = 20_000;
        assert_eq!(
            ContentKind::for_repository(&r, now()),
            ContentKind::PopularSpotlight
        );
    }

    #[test]
    fn detects_ai_from_description_words() {
        let mut r = repo();
        r.description = Some("An AI pair programmer".to_string());
        assert_eq!(ContentKind::for_repository(&r, now()), ContentKind::AiToolReview);

        r.description = Some("Email client".to_string());
        assert_eq!(ContentKind::for_repository(&r, now()), ContentKind::DeepDive);
    }

    #[test]
    fn picks_audience() {
        let mut r = repo();
        assert_eq!(target_audience(&r), "General Developers, Programming Enthusiasts");

        r.language = Some("TypeScript".to_string());
        assert_eq!(target_audience(&r), "Frontend Developers, Full-stack Engineers");

        r.topics = vec!["Machine-Learning".to_string()];
        assert_eq!(target_audience(&r), "AI/ML Engineers, Data Scientists");
    }

    #[test]
    fn tags_include_language_and_first_topics() {
        let mut r = repo();
        r.topics = (0..8).map(|i| format!("topic{i}")).collect();

        let profile = ContentProfile::for_repository(&r, now());

        assert_eq!(profile.tags.len(), 10);
        assert_eq!(profile.tags[5], "rust");
        assert_eq!(profile.tags[9], "topic3");
    }

    #[test]
    fn titles_use_grouped_star_counts() {
        let mut r = repo();
        r.stars = 12_345;

        let profile = ContentProfile::for_repository(&r, now());

        assert_eq!(profile.titles.len(), 5);
        assert_eq!(
            profile.titles[0],
            "This Rust Repository Has 12,345 Stars - Here's Why"
        );
        assert_eq!(profile.titles[3], "Why widgets is Trending on GitHub Right Now");
    }
}
