use crate::config::RepoId;
use crate::types::PullRequestRecord;
use futures::stream::{self, BoxStream, StreamExt};

/// Anything that can list the closed pull requests of a repository.
///
/// The stream is lazy and yields records in a stable order; an `Err` item ends
/// the run.
pub trait PullRequestSource {
    fn closed_pull_requests<'a>(
        &'a self,
        repo: &'a RepoId,
    ) -> BoxStream<'a, anyhow::Result<PullRequestRecord>>;
}

/// Serves the same fixed set of records for any repository.
impl PullRequestSource for Vec<PullRequestRecord> {
    fn closed_pull_requests<'a>(
        &'a self,
        _repo: &'a RepoId,
    ) -> BoxStream<'a, anyhow::Result<PullRequestRecord>> {
        stream::iter(self.iter().cloned().map(Ok)).boxed()
    }
}
