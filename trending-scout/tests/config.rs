use chrono::{TimeZone, Utc};
use std::path::PathBuf;

use trending_scout::{ConfigError, RepositorySummary, Scorer, ScoutConfigFile};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn load_config_from_fixture() {
    let config = ScoutConfigFile::load(&fixture("scout.toml")).unwrap();

    assert_eq!(config.search.per_page, 25);
    assert_eq!(config.search.max_results, 1000);
    assert_eq!(config.search.concurrency, 2);
    assert_eq!(config.search.initial_quota, Some(30));
    assert_eq!(config.scoring.topic_cap, 3);
    assert_eq!(config.scoring.language_boosts.len(), 2);
    assert_eq!(config.analysis.timeout_secs, 45);
    assert!(config.llm.is_some());
}

#[test]
fn fixture_boosts_drive_scoring() {
    let config = ScoutConfigFile::load(&fixture("scout.toml")).unwrap();
    let scorer = Scorer::new(&config.scoring);

    assert_eq!(scorer.language_boost(Some("rust")), 1.5);
    assert_eq!(scorer.language_boost(Some("Zig")), 1.3);
    // Table replaces the built-in one.
    assert_eq!(scorer.language_boost(Some("Python")), 1.0);

    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let repo = RepositorySummary {
        full_name: "acme/many-topics".to_string(),
        stars: 0,
        forks: 0,
        watchers: 0,
        open_issues: 0,
        language: None,
        topics: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
        created_at: created,
        pushed_at: created,
        has_wiki: false,
        description: None,
        html_url: "https://github.com/acme/many-topics".to_string(),
        license: None,
    };
    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();

    assert_eq!(scorer.breakdown(&repo, now).activity, 3.0);
}

#[test]
fn invalid_fixture_is_rejected() {
    let result = ScoutConfigFile::load(&fixture("invalid.toml"));

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn missing_file_uses_defaults() {
    let config = ScoutConfigFile::load_or_default(&fixture("does-not-exist.toml")).unwrap();

    assert_eq!(config, ScoutConfigFile::default());
}
