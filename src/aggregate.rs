//! Reduces fetched repositories and contributor history into the profile metrics.

use crate::config::Config;
use crate::model::{ContributorStats, Repository};
use crate::stats::{ContributorStatsApi, RetryPolicy, fetch_with_retry};
use chrono::{DateTime, Months, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// Sum of stargazers over every repository.
pub fn total_stars(repos: &[Repository]) -> u64 {
    repos.iter().map(|r| r.stargazers_count).sum()
}

/// The instant twelve calendar months before `now`.
pub fn one_year_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(12)).unwrap_or(now)
}

/// Repositories that may hold commits after `cutoff`. Without a cutoff every
/// repository qualifies.
pub fn updated_after(
    repos: &[Repository],
    cutoff: Option<DateTime<Utc>>,
) -> impl Iterator<Item = &Repository> {
    repos
        .iter()
        .filter(move |r| cutoff.is_none_or(|c| r.updated_at > c))
}

/// Commits `username` authored according to one repository's stats.
///
/// The author match is exact and case-sensitive. With a cutoff only weeks
/// starting strictly after it are counted; without one the all-time total is used.
pub fn commits_for_user(
    stats: &[ContributorStats],
    username: &str,
    cutoff: Option<DateTime<Utc>>,
) -> u64 {
    let Some(user) = stats.iter().find(|s| s.login() == Some(username)) else {
        return 0;
    };

    match cutoff {
        None => user.total,
        Some(cutoff) => user
            .weeks
            .iter()
            .filter(|week| week.week_start().is_some_and(|start| start > cutoff))
            .map(|week| week.c)
            .sum(),
    }
}

/// Counts a user's commits across repositories, fetching contributor stats
/// with at most `concurrency` requests in flight.
pub struct CommitCounter<'a, A: ?Sized> {
    api: &'a A,
    username: &'a str,
    retry: RetryPolicy,
    concurrency: usize,
}

impl<'a, A> CommitCounter<'a, A>
where
    A: ContributorStatsApi + ?Sized,
{
    pub fn new(api: &'a A, username: &'a str, retry: RetryPolicy, concurrency: usize) -> Self {
        Self {
            api,
            username,
            retry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(api: &'a A, config: &'a Config) -> Self {
        Self::new(api, &config.username, config.retry, config.concurrency)
    }

    /// Total commits over `repos`. Repositories not updated after `cutoff`
    /// are skipped without a request. A repository whose stats cannot be
    /// fetched contributes zero.
    pub async fn total(&self, repos: &[Repository], cutoff: Option<DateTime<Utc>>) -> u64 {
        let counts: Vec<u64> = stream::iter(updated_after(repos, cutoff))
            .map(|repo| self.repo_commits(repo, cutoff))
            .buffered(self.concurrency)
            .collect()
            .await;

        counts.into_iter().sum()
    }

    async fn repo_commits(&self, repo: &Repository, cutoff: Option<DateTime<Utc>>) -> u64 {
        info!(repo = %repo.name, "processing commits");

        match fetch_with_retry(self.api, self.retry, &repo.owner.login, &repo.name).await {
            Ok(stats) => commits_for_user(&stats, self.username, cutoff),
            Err(e) => {
                // don't fail the whole run for one repo; log and count zero.
                warn!(repo = %repo.name, error = %e, "failed to get contributor stats");
                0
            }
        }
    }
}
