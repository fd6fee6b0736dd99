use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use github_pr_stats::config::RepoId;
use github_pr_stats::fetcher::{collect_stats, fetch_and_build_report};
use github_pr_stats::metrics::MergeRateFormula;
use github_pr_stats::progress::ProgressMeter;
use github_pr_stats::source::PullRequestSource;
use github_pr_stats::types::PullRequestRecord;

fn repo_id() -> RepoId {
    RepoId::new("test_owner", "test_repo")
}

/// Tuesday, 2024-01-02 10:00 UTC.
fn tuesday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap()
}

fn pr(number: u64, days_open: i64, comments: u32, merged: bool) -> PullRequestRecord {
    PullRequestRecord {
        number,
        created_at: tuesday(),
        closed_at: tuesday() + Duration::days(days_open),
        is_merged: merged,
        comment_count: comments,
    }
}

/// Ten pull requests, seven merged.
fn sample() -> Vec<PullRequestRecord> {
    vec![
        pr(10, 0, 1, true),
        pr(9, 1, 0, true),
        pr(8, 1, 2, true),
        pr(7, 3, 0, false),
        pr(6, 0, 4, true),
        pr(5, 5, 1, true),
        pr(4, 1, 0, false),
        pr(3, 0, 0, true),
        pr(2, 2, 3, false),
        pr(1, 7, 1, true),
    ]
}

/// Yields a few records and then fails, like a page fetch dropping mid-run.
struct FailingSource;

impl PullRequestSource for FailingSource {
    fn closed_pull_requests<'a>(
        &'a self,
        _repo: &'a RepoId,
    ) -> BoxStream<'a, anyhow::Result<PullRequestRecord>> {
        stream::iter(vec![
            Ok(pr(2, 1, 0, true)),
            Err(anyhow::anyhow!("connection reset")),
            Ok(pr(1, 1, 0, true)),
        ])
        .boxed()
    }
}

#[tokio::test]
async fn test_collect_stats_from_source() {
    let source = sample();
    let state = collect_stats(&source, &repo_id(), &ProgressMeter::hidden())
        .await
        .unwrap();

    assert_eq!(state.total_count, 10);
    assert_eq!(state.merged_count, 7);
    assert_eq!(state.days_open_series, vec![0, 1, 1, 3, 0, 5, 1, 0, 2, 7]);
    assert_eq!(state.comments_series.len(), 10);
    assert_eq!(state.days_open_histogram.total(), 10);
    assert_eq!(state.comments_histogram.total(), 10);
    assert_eq!(state.created_weekdays.total(), 10);
    assert_eq!(state.closed_weekdays.total(), 10);
}

#[tokio::test]
async fn test_all_created_on_one_weekday() {
    let source = sample();
    let state = collect_stats(&source, &repo_id(), &ProgressMeter::hidden())
        .await
        .unwrap();

    let buckets: Vec<(&str, usize)> = state.created_weekdays.iter().collect();
    assert_eq!(buckets.len(), 7);
    for (label, count) in buckets {
        if label == "T" {
            assert_eq!(count, 10);
        } else {
            assert_eq!(count, 0, "unexpected count for {label}");
        }
    }
}

#[tokio::test]
async fn test_invalid_record_is_skipped() {
    let mut source = sample();
    source.push(PullRequestRecord {
        number: 11,
        created_at: tuesday(),
        closed_at: tuesday() - Duration::days(2),
        is_merged: true,
        comment_count: 9,
    });

    let state = collect_stats(&source, &repo_id(), &ProgressMeter::hidden())
        .await
        .unwrap();

    assert_eq!(state.total_count, 10);
    assert_eq!(state.merged_count, 7);
    assert!(!state.comments_series.contains(&9));
}

#[tokio::test]
async fn test_source_error_aborts_run() {
    let result = collect_stats(&FailingSource, &repo_id(), &ProgressMeter::hidden()).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_no_closed_pull_requests() {
    let source: Vec<PullRequestRecord> = Vec::new();
    let err = fetch_and_build_report(
        &source,
        &repo_id(),
        MergeRateFormula::Corrected,
        &ProgressMeter::hidden(),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "no closed pull requests found for test_owner/test_repo"
    );
}

#[tokio::test]
async fn test_report_text_output() {
    let source = sample();
    let report = fetch_and_build_report(
        &source,
        &repo_id(),
        MergeRateFormula::Corrected,
        &ProgressMeter::hidden(),
    )
    .await
    .unwrap();

    let text = report.render_text(20);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "70.00% (7 of 10) closed pulls merged.");
    assert_eq!(
        lines[1],
        "Days open: 2.00 (mean) 1.00 (median) 2.24 (std. dev.) 0 (min) 7 (max)"
    );
    assert_eq!(lines[2], "Days Open");

    // Days 0 through 7 inclusive, including the empty 4 and 6 buckets.
    let day_rows = &lines[4..12];
    let labels: Vec<&str> = day_rows
        .iter()
        .map(|line| line.rsplit(' ').next().unwrap())
        .collect();
    assert_eq!(labels, vec!["0", "1", "2", "3", "4", "5", "6", "7"]);
    assert!(day_rows[4].trim_start().starts_with("0  4"));

    assert!(lines[12].starts_with("Comments: "));
    assert!(text.contains("Day of Week Created"));
    assert!(text.contains("Day of Week Closed"));
    assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn test_legacy_merge_rate() {
    let source = sample();
    let report = fetch_and_build_report(
        &source,
        &repo_id(),
        MergeRateFormula::Legacy,
        &ProgressMeter::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(report.merge_rate.percentage, Some(98.57));
    assert!(report
        .render_text(10)
        .starts_with("98.57% (7 of 10) closed pulls merged."));
}

#[tokio::test]
async fn test_report_json_contract() {
    let source = sample();
    let report = fetch_and_build_report(
        &source,
        &repo_id(),
        MergeRateFormula::Corrected,
        &ProgressMeter::hidden(),
    )
    .await
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();

    assert_eq!(json["repository"], "test_owner/test_repo");
    assert_eq!(json["merge_rate"]["merged"], 7);
    assert_eq!(json["merge_rate"]["total"], 10);
    assert_eq!(json["merge_rate"]["formula"], "corrected");
    assert_eq!(json["merge_rate"]["percentage"], 70.0);

    assert_eq!(json["days_open"]["summary"]["min"], 0);
    assert_eq!(json["days_open"]["summary"]["max"], 7);
    assert_eq!(json["days_open"]["summary"]["median"], 1.0);
    assert_eq!(json["days_open"]["histogram"]["1"], 3);
    assert_eq!(json["days_open"]["histogram"]["6"], 0);

    assert_eq!(json["comments"]["summary"]["max"], 4);
    assert_eq!(json["day_of_week_created"]["T"], 10);
    assert_eq!(json["day_of_week_created"]["Su"], 0);

    let closed_keys: Vec<&String> = json["day_of_week_closed"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(closed_keys.len(), 7);
}
