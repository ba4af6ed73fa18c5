use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{ContributorStats, Repository};
use crate::stats::{ContributorStatsApi, StatsResponse};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("readme-upgrader/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;

#[derive(Clone)]
pub struct GithubClient {
    token: Arc<String>,
    api_url: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Create a REST client for the account described by `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::http("building HTTP client", e))?;

        Ok(Self {
            token: Arc::new(config.token.clone()),
            api_url: Arc::new(config.api_url.clone()),
            http: Arc::new(http),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// GET with basic retry/backoff. Any 2xx response is returned as-is,
    /// including 202 and 204 which callers interpret themselves.
    async fn get(&self, path: &str, query: &[(&str, String)], operation: &str) -> Result<Response> {
        // Simple retry/backoff policy
        const MAX_RETRIES: usize = 4;
        let mut attempt = 0usize;
        let url = self.endpoint(path);

        loop {
            attempt += 1;

            let resp = self
                .http
                .get(&url)
                .bearer_auth(&*self.token)
                .header(ACCEPT, "application/vnd.github+json")
                .query(query)
                .send()
                .await
                .map_err(|e| Error::http(operation, e))?;

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            // If rate limited, honor Retry-After header when present
            if status == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RETRIES {
                let wait_secs = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(2);
                debug!(operation, wait_secs, "rate limited");
                sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }

            if status.is_server_error() && attempt < MAX_RETRIES {
                let backoff = Duration::from_millis(250u64.saturating_mul(1 << (attempt - 1)));
                debug!(operation, status = status.as_u16(), ?backoff, "server error, retrying");
                sleep(backoff).await;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
    }

    /// List every repository owned by the authenticated account.
    pub async fn list_owned_repos(&self) -> Result<Vec<Repository>> {
        let repos = fetch_all_pages(self, PER_PAGE).await?;
        info!(count = repos.len(), "fetched repositories");
        Ok(repos)
    }
}

/// One page of a paginated repository listing. Pages are 1-based.
pub trait RepoPageSource {
    async fn repo_page(&self, page: usize, per_page: usize) -> Result<Vec<Repository>>;
}

impl RepoPageSource for GithubClient {
    async fn repo_page(&self, page: usize, per_page: usize) -> Result<Vec<Repository>> {
        let operation = format!("listing repositories (page {page})");
        let query = [
            ("affiliation", "owner".to_string()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ];
        self.get("/user/repos", &query, &operation)
            .await?
            .json()
            .await
            .map_err(|e| Error::http(&operation, e))
    }
}

/// Request pages until one comes back shorter than `per_page`. Any failed
/// page fails the whole listing.
pub async fn fetch_all_pages<S>(source: &S, per_page: usize) -> Result<Vec<Repository>>
where
    S: RepoPageSource + ?Sized,
{
    let mut repos = Vec::new();
    let mut page = 1usize;

    loop {
        let batch = source.repo_page(page, per_page).await?;
        let len = batch.len();
        repos.extend(batch);
        if len < per_page {
            return Ok(repos);
        }
        page += 1;
    }
}

/// Statuses that settle a contributor-stats request without reading the body.
fn stats_without_body(status: StatusCode) -> Option<StatsResponse> {
    match status {
        StatusCode::ACCEPTED => Some(StatsResponse::Pending),
        // empty repositories have no contributors
        StatusCode::NO_CONTENT => Some(StatsResponse::Ready(Vec::new())),
        _ => None,
    }
}

impl ContributorStatsApi for GithubClient {
    async fn contributor_stats(&self, owner: &str, repo: &str) -> Result<StatsResponse> {
        let operation = format!("contributor stats for {owner}/{repo}");
        let resp = self
            .get(&format!("/repos/{owner}/{repo}/stats/contributors"), &[], &operation)
            .await?;

        if let Some(settled) = stats_without_body(resp.status()) {
            return Ok(settled);
        }
        let stats: Vec<ContributorStats> = resp.json().await.map_err(|e| Error::http(&operation, e))?;
        Ok(StatsResponse::Ready(stats))
    }
}
