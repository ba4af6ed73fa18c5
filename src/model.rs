//! Data shapes shared by the fetchers, the aggregator, the cache and the renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Colors handed to the template as the `colors` list.
pub const PALETTE: [&str; 5] = ["474342", "fbedf6", "c9594d", "f8b9b2", "ae9c9d"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A repository as listed by the API.
///
/// Fields this tool does not read are kept in `extra` so a cached snapshot
/// stays a faithful copy of the raw listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: Owner,
    pub stargazers_count: u64,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Author {
    pub login: String,
}

/// One week of commit activity. `w` is the week start in epoch seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeeklyCommits {
    pub w: i64,
    pub c: u64,
}

impl WeeklyCommits {
    pub fn week_start(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.w, 0)
    }
}

/// Per-contributor commit history for one repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContributorStats {
    // ghost or deleted accounts come back as `null`
    pub author: Option<Author>,
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<WeeklyCommits>,
}

impl ContributorStats {
    pub fn login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }
}

/// Values substituted into the profile template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub total_stars: u64,
    pub total_commits_in_past_year: u64,
    pub colors: Vec<String>,
}

impl AggregateMetrics {
    pub fn new(total_stars: u64, total_commits_in_past_year: u64) -> Self {
        Self {
            total_stars,
            total_commits_in_past_year,
            colors: PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}
