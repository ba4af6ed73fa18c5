//! Run configuration, read once from the process environment.
//!
//! Everything a component needs (credentials, file locations, retry and
//! concurrency limits) travels in [`Config`]; no module reads the environment
//! on its own.

use crate::error::{Error, Result};
use crate::stats::RetryPolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub username: String,
    pub api_url: String,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    /// `None` disables the repository cache.
    pub cache_path: Option<PathBuf>,
    pub retry: RetryPolicy,
    /// Maximum contributor-stats requests in flight. 1 means sequential.
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub deadline: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} environment variable not set")))
        };

        let cache_path = match lookup("REPO_CACHE") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => Some(PathBuf::from("repo_cache.json")),
        };

        let defaults = RetryPolicy::default();
        let max_attempts: usize = parse_or(&lookup, "STATS_MAX_ATTEMPTS", defaults.max_attempts)?;
        let concurrency: usize = parse_or(&lookup, "STATS_CONCURRENCY", 4)?;
        if max_attempts == 0 {
            return Err(Error::Config("STATS_MAX_ATTEMPTS must be at least 1".into()));
        }
        if concurrency == 0 {
            return Err(Error::Config("STATS_CONCURRENCY must be at least 1".into()));
        }

        Ok(Self {
            token: required("GH_ACCESS_TOKEN")?,
            username: required("GH_USERNAME")?,
            api_url: lookup("GITHUB_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            template_path: lookup("README_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("main.mustache")),
            output_path: lookup("README_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("README.md")),
            cache_path,
            retry: RetryPolicy {
                max_attempts,
                delay: Duration::from_millis(parse_or(
                    &lookup,
                    "STATS_RETRY_DELAY_MS",
                    u64::try_from(defaults.delay.as_millis()).unwrap_or(u64::MAX),
                )?),
            },
            concurrency,
            request_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?),
            deadline: Duration::from_secs(parse_or(&lookup, "RUN_DEADLINE_SECS", 600)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got {raw:?}"))),
    }
}
