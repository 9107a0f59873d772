use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use trending_scout::config::ScoutConfigFile;
use trending_scout::fetch::{BackendError, SearchBackend, SearchPage};
use trending_scout::llm::{Completion, LlmError};
use trending_scout::query::{ORIGIN_FREE_TEXT, ORIGIN_NATURAL_RELAXED};
use trending_scout::{
    FetchError, QuerySpec, QuotaLedger, RateLimitInfo, Scout, ScoutError, Section, SpecInput,
};

type Responder = dyn Fn(&QuerySpec, u32) -> Result<SearchPage, BackendError> + Send + Sync;

/// Answers searches through a closure and records every query it saw.
struct FakeBackend {
    respond: Box<Responder>,
    seen: Mutex<Vec<(String, u32)>>,
}

impl FakeBackend {
    fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&QuerySpec, u32) -> Result<SearchPage, BackendError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(respond),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<(String, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(
        &self,
        query: &QuerySpec,
        page: u32,
        _: u8,
    ) -> Result<SearchPage, BackendError> {
        self.seen
            .lock()
            .unwrap()
            .push((query.to_query_string(), page));
        (self.respond)(query, page)
    }

    async fn repository(&self, full_name: &str) -> Result<Value, BackendError> {
        Ok(record(full_name, 10))
    }

    async fn rate_limit(&self) -> Result<RateLimitInfo, BackendError> {
        Err(BackendError::Transport("not scripted".to_string()))
    }
}

enum FakeCompletion {
    Reply(&'static str),
    Fail,
}

#[async_trait]
impl Completion for FakeCompletion {
    async fn complete(&self, _: Option<&str>, _: &str) -> Result<String, LlmError> {
        match self {
            FakeCompletion::Reply(text) => Ok((*text).to_string()),
            FakeCompletion::Fail => Err(LlmError::Completion("model offline".to_string())),
        }
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap()
}

fn record(full_name: &str, stars: i64) -> Value {
    json!({
        "full_name": full_name,
        "stargazers_count": stars,
        "forks_count": 2,
        "watchers_count": stars,
        "open_issues_count": 1,
        "language": "Python",
        "topics": ["cli"],
        "created_at": "2025-10-01T00:00:00Z",
        "pushed_at": "2025-10-12T00:00:00Z",
        "has_wiki": true,
        "description": "A test repository"
    })
}

fn page(items: Vec<Value>, has_next: bool) -> Result<SearchPage, BackendError> {
    Ok(SearchPage {
        total_count: 10,
        incomplete_results: false,
        items,
        has_next,
        rate_limit: None,
    })
}

fn scout(backend: Arc<FakeBackend>, completion: Option<FakeCompletion>) -> Scout {
    let mut file = ScoutConfigFile::default();
    file.search.per_page = 2;
    file.search.max_results = 10;

    Scout::with_parts(
        backend,
        completion.map(|c| Arc::new(c) as Arc<dyn Completion>),
        &file,
        Arc::new(QuotaLedger::new(100, Utc::now() + Duration::minutes(30))),
    )
}

#[tokio::test]
async fn throttled_page_keeps_earlier_results() {
    let reset = Utc::now() + Duration::minutes(7);
    let backend = FakeBackend::new(move |_, page_number| match page_number {
        1 => page(vec![record("acme/one", 50), record("acme/two", 40)], true),
        _ => Err(BackendError::Status {
            code: 429,
            reset_at: Some(reset),
            message: "secondary rate limit".to_string(),
        }),
    });
    let scout = scout(backend.clone(), None);

    let discovery = scout
        .discover_at(&SpecInput::raw("language:python"), now())
        .await
        .unwrap();

    assert_eq!(discovery.results.len(), 2);
    assert_eq!(discovery.summary.queries_partial, 1);
    assert_eq!(discovery.summary.pages_fetched, 1);
    assert_eq!(discovery.summary.retry_after(), Some(reset));
    assert_eq!(scout.remaining_quota(), (0, reset));
    assert_eq!(
        backend.seen(),
        vec![
            ("language:python".to_string(), 1),
            ("language:python".to_string(), 2)
        ]
    );
}

#[tokio::test]
async fn every_query_throttled_is_an_error() {
    let backend = FakeBackend::new(|_, _| {
        Err(BackendError::Status {
            code: 403,
            reset_at: None,
            message: "API rate limit exceeded".to_string(),
        })
    });
    let scout = scout(backend, None);
    let before = Utc::now();

    let err = scout
        .discover_at(&SpecInput::raw("stars:>10"), now())
        .await
        .unwrap_err();

    let ScoutError::Fetch(FetchError::RateLimitExceeded { reset_at, .. }) = &err else {
        panic!("expected a rate limit error, got {err:?}");
    };
    assert!(*reset_at > before);
    assert!(*reset_at <= Utc::now() + Duration::seconds(61));
}

#[tokio::test]
async fn duplicates_across_variants_keep_highest_score() {
    let backend = FakeBackend::new(|query, _| {
        if query.has_language() {
            page(vec![record("tools/fast", 100), record("libs/slow", 30)], false)
        } else {
            page(vec![record("Tools/Fast", 300), record("apps/new", 5)], false)
        }
    });
    let completion = FakeCompletion::Reply("```\nlanguage:python topic:cli\n```");
    let scout = scout(backend, Some(completion));

    let discovery = scout
        .discover_at(&SpecInput::natural("python command line tools"), now())
        .await
        .unwrap();

    let results = &discovery.results;
    assert_eq!(discovery.summary.queries_issued, 2);
    assert_eq!(discovery.summary.duplicates_collapsed, 1);
    assert!(!discovery.summary.translation_fallback);
    assert_eq!(results.len(), 3);

    let best = results.get("tools/fast").unwrap();
    assert_eq!(best.repository.stars, 300);
    assert_eq!(best.origin, ORIGIN_NATURAL_RELAXED);
    assert_eq!(results.position("TOOLS/FAST"), Some(0));

    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[tokio::test]
async fn failed_translation_falls_back_to_free_text() {
    let backend = FakeBackend::new(|_, _| page(vec![record("acme/cli", 20)], false));
    let scout = scout(backend.clone(), Some(FakeCompletion::Fail));

    let discovery = scout
        .discover_at(&SpecInput::natural("tiny rust cli"), now())
        .await
        .unwrap();

    assert!(discovery.summary.translation_fallback);
    assert_eq!(discovery.summary.queries_issued, 1);
    assert_eq!(backend.seen(), vec![("tiny rust cli".to_string(), 1)]);
    assert_eq!(discovery.results.top(1)[0].origin, ORIGIN_FREE_TEXT);
}

#[tokio::test]
async fn malformed_records_are_skipped_and_counted() {
    let backend = FakeBackend::new(|_, _| {
        page(
            vec![
                record("acme/good", 20),
                json!({ "full_name": "acme/broken" }),
                json!("garbage"),
            ],
            false,
        )
    });
    let scout = scout(backend, None);

    let discovery = scout
        .discover_at(&SpecInput::raw("topic:cli"), now())
        .await
        .unwrap();

    assert_eq!(discovery.results.len(), 1);
    assert_eq!(discovery.summary.records_seen, 3);
    assert_eq!(discovery.summary.records_skipped, 2);
}

#[tokio::test]
async fn analysis_marks_missing_sections() {
    let backend = FakeBackend::new(|_, _| page(vec![record("acme/cli", 20)], false));
    let completion = FakeCompletion::Reply(
        "## 1. Repository Overview\nA CLI.\n\n## 2. Technical Analysis\nWritten in Python.\n",
    );
    let scout = scout(backend, Some(completion));

    let discovery = scout
        .discover_at(&SpecInput::raw("topic:cli"), now())
        .await
        .unwrap();
    let top = &discovery.results.top(1)[0];
    let report = scout.analyze_repository(&top.repository).await.unwrap();

    assert_eq!(report.section(Section::Overview).as_str(), "A CLI.");
    assert_eq!(
        report.missing(),
        vec![
            Section::Community,
            Section::ContentOpportunities,
            Section::PracticalInsights
        ]
    );
    assert!(report.to_string().contains("Not available."));
}
