use crate::error::Result;
use crate::model::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON snapshot of the repository listing.
///
/// A readable snapshot replaces the live fetch entirely; it is never checked
/// for freshness. Delete the file to force a refetch.
pub struct RepoCache {
    path: PathBuf,
}

impl RepoCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or malformed snapshots are a cache miss.
    pub fn load(&self) -> Option<Vec<Repository>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no repository cache");
                return None;
            }
        };

        match serde_json::from_str(&data) {
            Ok(repos) => Some(repos),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring unreadable repository cache");
                None
            }
        }
    }

    /// Overwrite the snapshot with `repos`, pretty-printed.
    pub fn save(&self, repos: &[Repository]) -> Result<()> {
        let json = serde_json::to_string_pretty(repos)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> Vec<Repository> {
        serde_json::from_value(serde_json::json!([
            {
                "name": "site",
                "owner": { "login": "alice" },
                "stargazers_count": 5,
                "updated_at": "2026-08-01T09:30:00Z",
                "fork": false
            },
            {
                "name": "notes",
                "owner": { "login": "alice" },
                "stargazers_count": 0,
                "updated_at": "2023-01-15T00:00:00Z"
            }
        ]))
        .unwrap()
    }

    #[test]
    fn save_then_load_returns_same_list() {
        let dir = tempdir().unwrap();
        let cache = RepoCache::new(dir.path().join("repo_cache.json"));

        cache.save(&sample()).unwrap();
        assert_eq!(cache.load(), Some(sample()));

        let written = std::fs::read_to_string(cache.path()).unwrap();
        assert!(written.contains("\n  {"), "snapshot should be pretty-printed");
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempdir().unwrap();
        let cache = RepoCache::new(dir.path().join("repo_cache.json"));

        cache.save(&sample()).unwrap();
        cache.save(&sample()[..1]).unwrap();
        assert_eq!(cache.load().map(|r| r.len()), Some(1));
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = RepoCache::new(dir.path().join("absent.json"));
        assert_eq!(cache.load(), None);
    }

    #[test]
    fn malformed_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("repo_cache.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(RepoCache::new(&path).load(), None);

        std::fs::write(&path, r#"[{"name": "x"}]"#).unwrap();
        assert_eq!(RepoCache::new(&path).load(), None);
    }
}
