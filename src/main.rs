mod aggregate;
mod cache;
mod config;
mod error;
mod github;
mod model;
mod render;
mod stats;

use aggregate::{CommitCounter, one_year_before, total_stars};
use anyhow::{Context, Result, anyhow};
use cache::RepoCache;
use chrono::Utc;
use config::Config;
use github::GithubClient;
use model::{AggregateMetrics, Repository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let deadline = config.deadline;

    tokio::time::timeout(deadline, run(config))
        .await
        .map_err(|_| anyhow!("Run did not finish within {deadline:?}"))?
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("readme_upgrader=info")),
        )
        .with_target(false)
        .init();
}

async fn run(config: Config) -> Result<()> {
    let client = GithubClient::new(&config)?;
    let repos = load_repositories(&client, &config).await?;

    let stars = total_stars(&repos);
    let cutoff = one_year_before(Utc::now());
    let commits = CommitCounter::from_config(&client, &config)
        .total(&repos, Some(cutoff))
        .await;

    let metrics = AggregateMetrics::new(stars, commits);
    render::render_file(&config.template_path, &config.output_path, &metrics).with_context(|| {
        format!(
            "Failed to render {} into {}",
            config.template_path.display(),
            config.output_path.display()
        )
    })?;

    info!(
        stars,
        commits,
        "{} updated successfully!",
        config.output_path.display()
    );
    Ok(())
}

/// Use the cached snapshot when there is one, otherwise fetch and store it.
async fn load_repositories(client: &GithubClient, config: &Config) -> Result<Vec<Repository>> {
    let cache = config.cache_path.as_ref().map(RepoCache::new);

    if let Some(repos) = cache.as_ref().and_then(RepoCache::load) {
        info!(count = repos.len(), "using cached repository list");
        return Ok(repos);
    }

    let repos = client
        .list_owned_repos()
        .await
        .context("Failed to fetch repository list")?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.save(&repos) {
            warn!(path = %cache.path().display(), error = %e, "could not write repository cache");
        }
    }

    Ok(repos)
}
