use crate::config::RepoId;
use crate::source::PullRequestSource;
use crate::types::PullRequestRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use octocrab::models::issues::Comment;
use octocrab::models::pulls::PullRequest;
use octocrab::{Octocrab, Page};

/// Where the pull request listing currently stands.
enum Cursor {
    Start,
    /// The last page fetched; its `next` link points at the following one.
    After(Page<PullRequest>),
    Done,
}

#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
    page_size: u8,
}

impl GitHubClient {
    pub fn new(token: Option<String>, page_size: u8) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        Ok(Self {
            octocrab: builder.build()?,
            page_size,
        })
    }

    /// Fetches the repository once so that bad credentials or a missing
    /// repository fail before any pull request is listed.
    pub async fn ensure_repository(&self, repo_id: &RepoId) -> Result<()> {
        self.octocrab
            .repos(&repo_id.owner, &repo_id.repo)
            .get()
            .await
            .map_err(|e| classify_error(repo_id, e))?;
        tracing::debug!(repo_id = %repo_id, "Repository is accessible");
        Ok(())
    }

    /// Counts the discussion comments on a pull request, following every page.
    pub async fn count_comments(&self, repo_id: &RepoId, number: u64) -> Result<u32> {
        let mut page: Page<Comment> = self
            .octocrab
            .issues(&repo_id.owner, &repo_id.repo)
            .list_comments(number)
            .per_page(self.page_size)
            .send()
            .await
            .map_err(|e| classify_error(repo_id, e))?;

        let mut count = page.items.len();
        while let Some(next_page) = self
            .octocrab
            .get_page::<Comment>(&page.next)
            .await
            .map_err(|e| classify_error(repo_id, e))?
        {
            page = next_page;
            count += page.items.len();
        }

        u32::try_from(count)
            .with_context(|| format!("comment count of #{number} in {repo_id} does not fit in u32"))
    }

    async fn fetch_page(&self, repo_id: &RepoId, cursor: Cursor) -> Result<Option<Page<PullRequest>>> {
        let page = match cursor {
            Cursor::Start => Some(
                self.octocrab
                    .pulls(&repo_id.owner, &repo_id.repo)
                    .list()
                    .state(octocrab::params::State::Closed)
                    .per_page(self.page_size)
                    .send()
                    .await
                    .map_err(|e| classify_error(repo_id, e))?,
            ),
            Cursor::After(previous) => self
                .octocrab
                .get_page::<PullRequest>(&previous.next)
                .await
                .map_err(|e| classify_error(repo_id, e))?,
            Cursor::Done => None,
        };

        if let Some(page) = &page {
            tracing::debug!(repo_id = %repo_id, items = page.items.len(), "Fetched page of closed pull requests");
        }

        Ok(page)
    }

    /// Converts an API pull request into a record, counting its comments.
    ///
    /// Pull requests missing either timestamp are skipped.
    async fn to_record(&self, repo_id: &RepoId, pr: PullRequest) -> Result<Option<PullRequestRecord>> {
        let Some(mut record) =
            closed_record(pr.number, pr.created_at, pr.closed_at, pr.merged_at)
        else {
            tracing::warn!(repo_id = %repo_id, number = pr.number, "Skipping pull request without created_at/closed_at");
            return Ok(None);
        };

        record.comment_count = self.count_comments(repo_id, record.number).await?;
        Ok(Some(record))
    }
}

impl PullRequestSource for GitHubClient {
    fn closed_pull_requests<'a>(
        &'a self,
        repo_id: &'a RepoId,
    ) -> BoxStream<'a, Result<PullRequestRecord>> {
        let pages = stream::try_unfold(Cursor::Start, move |cursor| async move {
            let Some(mut page) = self.fetch_page(repo_id, cursor).await? else {
                return Ok::<_, anyhow::Error>(None);
            };
            let items = std::mem::take(&mut page.items);
            let next = if page.next.is_some() {
                Cursor::After(page)
            } else {
                Cursor::Done
            };
            Ok::<_, anyhow::Error>(Some((items, next)))
        });

        pages
            .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, anyhow::Error>)))
            .try_flatten()
            .try_filter_map(move |pr| self.to_record(repo_id, pr))
            .boxed()
    }
}

/// Builds a record from the listing's timestamps, with no comments counted yet.
///
/// Returns `None` when either `created_at` or `closed_at` is missing. A pull
/// request counts as merged when the listing carries a merge timestamp.
fn closed_record(
    number: u64,
    created_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
) -> Option<PullRequestRecord> {
    Some(PullRequestRecord {
        number,
        created_at: created_at?,
        closed_at: closed_at?,
        is_merged: merged_at.is_some(),
        comment_count: 0,
    })
}

/// Turns GitHub API failures into messages a user can act on.
fn classify_error(repo_id: &RepoId, err: octocrab::Error) -> anyhow::Error {
    let message = match &err {
        octocrab::Error::GitHub { source, .. } => source.message.to_lowercase(),
        _ => return anyhow::Error::new(err).context(format!("GitHub request for {repo_id} failed")),
    };

    let context = if message.contains("bad credentials") {
        "GitHub rejected the access token".to_string()
    } else if message.contains("rate limit") {
        "GitHub rate limit exceeded".to_string()
    } else if message.contains("not found") {
        format!("repository {repo_id} not found or not accessible")
    } else {
        format!("GitHub request for {repo_id} failed")
    };

    anyhow::Error::new(err).context(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap())
    }

    #[test]
    fn test_closed_record_copies_listing_fields() {
        let record = closed_record(17, at(1), at(4), None).unwrap();

        assert_eq!(record.number, 17);
        assert_eq!(record.created_at, at(1).unwrap());
        assert_eq!(record.closed_at, at(4).unwrap());
        assert!(!record.is_merged);
        assert_eq!(record.comment_count, 0);
    }

    #[test]
    fn test_closed_record_merged_when_merge_time_present() {
        let record = closed_record(3, at(1), at(2), at(2)).unwrap();
        assert!(record.is_merged);
    }

    #[test]
    fn test_closed_record_skips_missing_created_at() {
        assert_eq!(closed_record(5, None, at(2), at(2)), None);
    }

    #[test]
    fn test_closed_record_skips_missing_closed_at() {
        assert_eq!(closed_record(6, at(1), None, None), None);
    }
}
