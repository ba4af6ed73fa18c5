//! Contributor statistics with polling for results the API is still computing.

use crate::error::Result;
use crate::model::ContributorStats;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// What a single contributor-stats request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsResponse {
    /// The API accepted the request but has not finished computing (HTTP 202).
    Pending,
    Ready(Vec<ContributorStats>),
}

/// Bounded polling for [`StatsResponse::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
impl RetryPolicy {
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Source of raw contributor statistics. Implemented by the HTTP client and
/// by in-memory fakes in tests.
pub trait ContributorStatsApi {
    async fn contributor_stats(&self, owner: &str, repo: &str) -> Result<StatsResponse>;
}

/// Ask for `owner/repo` stats until they are ready or `policy` runs out.
///
/// Running out of attempts yields an empty list: the repository then counts
/// as zero. Request failures are returned to the caller unchanged.
pub async fn fetch_with_retry<A>(
    api: &A,
    policy: RetryPolicy,
    owner: &str,
    repo: &str,
) -> Result<Vec<ContributorStats>>
where
    A: ContributorStatsApi + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        match api.contributor_stats(owner, repo).await? {
            StatsResponse::Ready(stats) => return Ok(stats),
            StatsResponse::Pending => {
                info!(repo, attempt, "stats not ready, retrying");
                if attempt < policy.max_attempts && !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
            }
        }
    }

    debug!(repo, attempts = policy.max_attempts, "stats never became ready");
    Ok(Vec::new())
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted responses per repository. Each call pops the next one; an
    /// exhausted script keeps answering `Pending`.
    #[derive(Default)]
    pub struct FakeStatsApi {
        scripts: Mutex<HashMap<String, Vec<Scripted>>>,
        calls: Mutex<Vec<String>>,
    }

    pub enum Scripted {
        Pending,
        Ready(Vec<ContributorStats>),
        Fail,
    }

    impl FakeStatsApi {
        pub fn script(self, repo: &str, mut responses: Vec<Scripted>) -> Self {
            responses.reverse();
            self.scripts
                .lock()
                .unwrap()
                .insert(repo.to_string(), responses);
            self
        }

        pub fn ready(self, repo: &str, stats: Vec<ContributorStats>) -> Self {
            self.script(repo, vec![Scripted::Ready(stats)])
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ContributorStatsApi for FakeStatsApi {
        async fn contributor_stats(&self, _owner: &str, repo: &str) -> Result<StatsResponse> {
            self.calls.lock().unwrap().push(repo.to_string());
            let next = self
                .scripts
                .lock()
                .unwrap()
                .get_mut(repo)
                .and_then(|script| script.pop());
            match next {
                Some(Scripted::Ready(stats)) => Ok(StatsResponse::Ready(stats)),
                Some(Scripted::Fail) => Err(Error::Status {
                    operation: format!("contributor stats for {repo}"),
                    status: 500,
                    body: "boom".into(),
                }),
                Some(Scripted::Pending) | None => Ok(StatsResponse::Pending),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeStatsApi, Scripted};
    use super::*;
    use crate::model::Author;

    fn alice(total: u64) -> ContributorStats {
        ContributorStats {
            author: Some(Author {
                login: "alice".into(),
            }),
            total,
            weeks: vec![],
        }
    }

    #[tokio::test]
    async fn ready_on_first_attempt() {
        let api = FakeStatsApi::default().ready("site", vec![alice(3)]);
        let stats = fetch_with_retry(&api, RetryPolicy::immediate(5), "alice", "site")
            .await
            .unwrap();
        assert_eq!(stats, vec![alice(3)]);
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn pending_then_ready() {
        let api = FakeStatsApi::default().script(
            "site",
            vec![Scripted::Pending, Scripted::Pending, Scripted::Ready(vec![alice(9)])],
        );
        let stats = fetch_with_retry(&api, RetryPolicy::immediate(5), "alice", "site")
            .await
            .unwrap();
        assert_eq!(stats, vec![alice(9)]);
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn pending_past_ceiling_is_empty_not_error() {
        let api = FakeStatsApi::default();
        let stats = fetch_with_retry(&api, RetryPolicy::immediate(5), "alice", "slow")
            .await
            .unwrap();
        assert!(stats.is_empty());
        assert_eq!(api.calls().len(), 5);
    }

    #[tokio::test]
    async fn request_failure_is_returned() {
        let api = FakeStatsApi::default().script("broken", vec![Scripted::Fail]);
        let result = fetch_with_retry(&api, RetryPolicy::immediate(5), "alice", "broken").await;
        assert!(result.is_err());
        assert_eq!(api.calls().len(), 1);
    }
}
