//! CLI for Trending Scout.
//!
//! Discovers trending GitHub repositories by category or natural-language
//! request, ranks them and optionally analyzes the top results.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use trending_scout::{
    AnalysisError, AnalysisReport, Backoff, Category, ContentProfile, Discovery, DiscoverySummary,
    FetchError, RankedResultSet, Scout, ScoutConfig, ScoutError, SortField, SpecInput,
};
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Trending Scout - Discover, rank and analyze trending GitHub repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Path to the config file.
    #[arg(long, global = true, default_value = "scout.toml")]
    config: PathBuf,

    /// Number of ranked results to print.
    #[arg(long, global = true, default_value_t = 10)]
    limit: usize,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Attempts for transient upstream failures.
    #[arg(long, global = true, default_value_t = 3)]
    retries: u32,

    /// Analyze the N best results of a discovery.
    #[arg(long, global = true, default_value_t = 0)]
    analyze_top: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the discovery categories.
    Categories,

    /// Discover repositories in a category.
    Discover {
        /// Category name, e.g. `hidden-gems`.
        #[arg(long)]
        category: Category,

        /// Lookback window in days (1-30).
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Search with a natural-language request or raw search syntax.
    Search {
        /// Request text.
        text: String,

        /// Treat the text as raw search syntax.
        #[arg(long)]
        raw: bool,

        /// Sort field: stars, forks, updated or help-wanted-issues.
        #[arg(long)]
        sort: Option<SortField>,
    },

    /// Analyze a single repository.
    Analyze {
        /// Repository in owner/name form.
        repository: String,
    },

    /// Show the remaining search quota.
    Quota {
        /// Ask the provider instead of the local estimate.
        #[arg(long)]
        refresh: bool,
    },
}

/// How a command ended.
enum Outcome {
    Success,
    Partial,
}

/// Any failure that aborts a command.
#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Scout(ScoutError),

    #[error(transparent)]
    Analysis(AnalysisError),

    #[error(transparent)]
    Fetch(FetchError),

    #[error("Failed to serialize output: {0}")]
    Output(serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // Both ring and aws-lc-rs may be linked; pick one explicitly.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    match run(args).await {
        Ok(Outcome::Success) => ExitCode::from(0),
        Ok(Outcome::Partial) => ExitCode::from(1),
        Err(e) => {
            if let Some(reset_at) = reset_time(&e) {
                error!(error = %e, %reset_at, "Rate limit exceeded; retry after reset");
            } else {
                error!(error = %e, "Critical failure");
            }
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with a compact formatter and `RUST_LOG` filtering
/// (defaults to "info").
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<Outcome, Failure> {
    if let Command::Categories = args.command {
        print_categories(args.json).map_err(Failure::Output)?;
        return Ok(Outcome::Success);
    }

    let config = ScoutConfig::new(args.token.clone()).with_config_path(args.config.clone());
    let scout = Scout::new(config).map_err(Failure::Scout)?;
    let backoff = Backoff::with_attempts(args.retries);

    match &args.command {
        Command::Categories => Ok(Outcome::Success),
        Command::Discover { category, days } => {
            let input = SpecInput::category(*category, *days);
            discover(&scout, &input, &args, &backoff).await
        }
        Command::Search { text, raw, sort } => {
            let input = if *raw {
                SpecInput::Raw {
                    text: text.clone(),
                    sort: *sort,
                }
            } else {
                SpecInput::NaturalLanguage {
                    text: text.clone(),
                    sort: *sort,
                }
            };
            discover(&scout, &input, &args, &backoff).await
        }
        Command::Analyze { repository } => {
            let report = backoff
                .retry(|| scout.analyze(repository), is_transient_analysis)
                .await
                .map_err(Failure::Analysis)?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("{report}");
            }
            Ok(Outcome::Success)
        }
        Command::Quota { refresh } => {
            let (remaining, reset_at) = if *refresh {
                let info = scout.refresh_quota().await.map_err(Failure::Fetch)?;
                (info.remaining, info.reset)
            } else {
                scout.remaining_quota()
            };
            if args.json {
                print_json(&serde_json::json!({
                    "remaining": remaining,
                    "reset_at": reset_at,
                }))?;
            } else {
                println!("Remaining search requests: {remaining}");
                println!("Resets at: {reset_at}");
            }
            Ok(Outcome::Success)
        }
    }
}

/// Runs a discovery and prints the ranked results.
async fn discover(
    scout: &Scout,
    input: &SpecInput,
    args: &Args,
    backoff: &Backoff,
) -> Result<Outcome, Failure> {
    let Discovery { results, summary } = backoff
        .retry(|| scout.discover(input), is_transient_discovery)
        .await
        .map_err(Failure::Scout)?;

    let analyses = analyze_top(scout, &results, args, backoff).await;
    let partial = summary.has_failures() || analyses.iter().any(Result::is_err);

    if args.json {
        let analyses: Vec<_> = analyses
            .iter()
            .map(|analysis| match analysis {
                Ok(report) => serde_json::json!({ "report": report }),
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            })
            .collect();
        print_json(&serde_json::json!({
            "results": results.top(args.limit),
            "summary": summary,
            "analyses": analyses,
        }))?;
    } else {
        print_results(scout, &results, args.limit);
        for analysis in &analyses {
            match analysis {
                Ok(report) => println!("\n{report}"),
                Err(e) => println!("\nAnalysis failed: {e}"),
            }
        }
        print_summary(&summary);
    }

    if let Some(reset_at) = summary.retry_after() {
        warn!(%reset_at, "Some queries hit the rate limit");
    }

    Ok(if partial {
        Outcome::Partial
    } else {
        Outcome::Success
    })
}

/// Analyzes the top `--analyze-top` results sequentially.
async fn analyze_top(
    scout: &Scout,
    results: &RankedResultSet,
    args: &Args,
    backoff: &Backoff,
) -> Vec<Result<AnalysisReport, AnalysisError>> {
    if args.analyze_top == 0 {
        return Vec::new();
    }
    if !scout.can_analyze() {
        warn!("No completion model configured; skipping analysis");
        return Vec::new();
    }

    let mut reports = Vec::new();
    for scored in results.top(args.analyze_top) {
        let report = backoff
            .retry(
                || scout.analyze_repository(&scored.repository),
                is_transient_analysis,
            )
            .await;
        if let Err(e) = &report {
            warn!(repository = scored.full_name(), error = %e, "Analysis failed");
        }
        reports.push(report);
    }
    reports
}

fn is_transient_discovery(error: &ScoutError) -> bool {
    matches!(error, ScoutError::Fetch(FetchError::Upstream { .. }))
}

fn is_transient_analysis(error: &AnalysisError) -> bool {
    matches!(
        error,
        AnalysisError::Upstream { .. } | AnalysisError::Fetch(FetchError::Upstream { .. })
    )
}

fn reset_time(failure: &Failure) -> Option<chrono::DateTime<Utc>> {
    match failure {
        Failure::Scout(ScoutError::Fetch(e))
        | Failure::Analysis(AnalysisError::Fetch(e))
        | Failure::Fetch(e) => e.reset_at(),
        _ => None,
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Failure> {
    let text = serde_json::to_string_pretty(value).map_err(Failure::Output)?;
    println!("{text}");
    Ok(())
}

fn print_categories(json: bool) -> Result<(), serde_json::Error> {
    if json {
        let names: Vec<_> = Category::ALL
            .iter()
            .map(|c| serde_json::json!({ "name": c.name(), "label": c.label() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for category in Category::ALL {
            println!("{:<18} {}", category.name(), category.label());
        }
    }
    Ok(())
}

/// Prints the ranked results with their score breakdown and content plan.
fn print_results(scout: &Scout, results: &RankedResultSet, limit: usize) {
    let now = Utc::now();
    if results.is_empty() {
        println!("No repositories found.");
        return;
    }

    for (rank, scored) in results.top(limit).iter().enumerate() {
        let repo = &scored.repository;
        let profile = ContentProfile::for_repository(repo, now);
        println!(
            "{:>3}. {} ({} stars, score {:.1}) [{}]",
            rank + 1,
            repo.full_name,
            repo.stars,
            scored.score,
            scored.origin
        );
        println!("     {}", scout.scorer().breakdown(repo, now));
        if let Some(description) = &repo.description {
            println!("     {description}");
        }
        println!("     {} | {}", profile.kind.label(), profile.audience);
        println!("     {}", repo.html_url);
    }
}

/// Prints the discovery summary.
fn print_summary(summary: &DiscoverySummary) {
    println!("\nSummary:");
    println!("  Queries issued: {}", summary.queries_issued);
    println!("  Queries complete: {}", summary.queries_complete);
    println!("  Queries partial: {}", summary.queries_partial);
    println!("  Queries failed: {}", summary.queries_failed);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Records skipped: {}", summary.records_skipped);
    println!("  Duplicates collapsed: {}", summary.duplicates_collapsed);
    if summary.translation_fallback {
        println!("  Translation: fell back to free-text search");
    }
    for error in summary.failures() {
        println!("  Failed: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trending_scout::UpstreamCause;

    fn throttled() -> FetchError {
        FetchError::RateLimitExceeded {
            query: "language:rust".to_string(),
            reset_at: Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap(),
        }
    }

    fn upstream() -> FetchError {
        FetchError::Upstream {
            query: "language:rust".to_string(),
            cause: UpstreamCause::Status(502),
        }
    }

    #[test]
    fn wrapped_failures_display_their_source() {
        let failure = Failure::Scout(ScoutError::Fetch(upstream()));
        assert_eq!(failure.to_string(), upstream().to_string());

        let failure = Failure::Analysis(AnalysisError::Fetch(throttled()));
        assert_eq!(failure.to_string(), throttled().to_string());
    }

    #[test]
    fn output_failure_is_labelled() {
        let Err(e) = serde_json::from_str::<serde_json::Value>("{") else {
            panic!("expected a parse error");
        };
        let failure = Failure::Output(e);

        assert!(failure
            .to_string()
            .starts_with("Failed to serialize output: "));
    }

    #[test]
    fn reset_time_is_found_through_every_wrapper() {
        let reset_at = throttled().reset_at();
        assert!(reset_at.is_some());

        for failure in [
            Failure::Scout(ScoutError::Fetch(throttled())),
            Failure::Analysis(AnalysisError::Fetch(throttled())),
            Failure::Fetch(throttled()),
        ] {
            assert_eq!(reset_time(&failure), reset_at);
        }
        assert_eq!(reset_time(&Failure::Fetch(upstream())), None);
    }

    #[test]
    fn only_upstream_errors_are_retried() {
        assert!(is_transient_discovery(&ScoutError::Fetch(upstream())));
        assert!(!is_transient_discovery(&ScoutError::Fetch(throttled())));
        assert!(is_transient_analysis(&AnalysisError::Fetch(upstream())));
        assert!(!is_transient_analysis(&AnalysisError::Fetch(throttled())));
    }
}
