use crate::config::RepoId;
use crate::metrics::{AggregateState, MergeRateFormula, StatsAccumulator};
use crate::progress::ProgressMeter;
use crate::report::Report;
use crate::source::PullRequestSource;
use anyhow::{bail, Result};
use futures::TryStreamExt;

/// Streams every closed pull request of `repo_id` from `source` into an
/// [`AggregateState`].
///
/// Records that fail validation are logged and skipped; any source error aborts
/// the whole run.
pub async fn collect_stats<S>(
    source: &S,
    repo_id: &RepoId,
    progress: &ProgressMeter,
) -> Result<AggregateState>
where
    S: PullRequestSource + ?Sized,
{
    let mut accumulator = StatsAccumulator::new();
    let mut records = source.closed_pull_requests(repo_id);

    let outcome = loop {
        match records.try_next().await {
            Ok(Some(record)) => {
                progress.update(record.number);
                if let Err(e) = accumulator.ingest(&record) {
                    tracing::warn!(repo_id = %repo_id, "Skipping pull request: {}", e);
                }
            }
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    progress.finish();
    outcome?;

    let state = accumulator.finish();
    tracing::debug!(
        repo_id = %repo_id,
        total = state.total_count,
        merged = state.merged_count,
        "Finished collecting closed pull requests"
    );
    Ok(state)
}

/// Fetches closed pull requests and reduces them into a [`Report`].
///
/// This keeps data retrieval and aggregation apart from argument parsing and
/// output, so the pipeline can run against any [`PullRequestSource`].
pub async fn fetch_and_build_report<S>(
    source: &S,
    repo_id: &RepoId,
    formula: MergeRateFormula,
    progress: &ProgressMeter,
) -> Result<Report>
where
    S: PullRequestSource + ?Sized,
{
    let state = collect_stats(source, repo_id, progress).await?;

    if state.total_count == 0 {
        bail!("no closed pull requests found for {repo_id}");
    }

    Ok(Report::from_state(repo_id.to_string(), state, formula)?)
}
