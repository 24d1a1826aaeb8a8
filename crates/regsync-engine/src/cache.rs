//! Timestamped key/value snapshot cache.
//!
//! Format: first line is the Unix timestamp (seconds, float) of the
//! write; every following line is `key:value`, split on the first
//! colon.  A cache is fresh while its age is below the configured
//! lifetime; a stale or unreadable file simply yields a miss.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

/// File-backed cache for expensive snapshot fetches.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
    lifetime: Duration,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>, lifetime: Duration) -> Self {
        Self {
            path: path.into(),
            lifetime,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached map, or `None` when the file is missing, stale,
    /// or malformed.
    pub fn load(&self) -> Option<BTreeMap<String, String>> {
        self.load_at(now_secs())
    }

    fn load_at(&self, now: f64) -> Option<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "cache miss");
                return None;
            }
        };
        let mut lines = text.lines();
        let written: f64 = lines.next()?.trim().parse().ok()?;
        let age = now - written;
        if age >= self.lifetime.as_secs_f64() {
            debug!(path = %self.path.display(), age, "cache stale");
            return None;
        }
        let mut map = BTreeMap::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((key, value)) => {
                    map.insert(key.to_string(), value.to_string());
                }
                None => {
                    warn!(path = %self.path.display(), line, "skipping malformed cache line");
                }
            }
        }
        debug!(path = %self.path.display(), entries = map.len(), age, "cache hit");
        Some(map)
    }

    /// Persist the map, stamping it with the current time.
    pub fn store(&self, map: &BTreeMap<String, String>) -> std::io::Result<()> {
        let mut file = std::fs::File::create(&self.path)?;
        writeln!(file, "{}", now_secs())?;
        for (key, value) in map {
            writeln!(file, "{key}:{value}")?;
        }
        debug!(path = %self.path.display(), entries = map.len(), "cache written");
        Ok(())
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_in(dir: &tempfile::TempDir, lifetime: Duration) -> FileCache {
        FileCache::new(dir.path().join("snapshot.cache"), lifetime)
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, Duration::from_secs(1800));
        assert!(cache.load().is_none());
    }

    #[test]
    fn round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, Duration::from_secs(1800));
        let mut map = BTreeMap::new();
        map.insert("alice".to_string(), "proj1,proj2".to_string());
        map.insert("bob".to_string(), "proj1".to_string());
        cache.store(&map).unwrap();
        assert_eq!(cache.load(), Some(map));
    }

    #[test]
    fn value_may_contain_colons() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, Duration::from_secs(1800));
        let mut map = BTreeMap::new();
        map.insert("key".to_string(), "a:b:c".to_string());
        cache.store(&map).unwrap();
        assert_eq!(cache.load().unwrap()["key"], "a:b:c");
    }

    #[test]
    fn freshness_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, Duration::from_secs(1800));
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), "v".to_string());
        cache.store(&map).unwrap();

        let written: f64 = std::fs::read_to_string(cache.path())
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        // 1000s old: still fresh under a 1800s lifetime.
        assert!(cache.load_at(written + 1000.0).is_some());
        // 5000s old: stale.
        assert!(cache.load_at(written + 5000.0).is_none());
        // Exactly at the lifetime counts as stale.
        assert!(cache.load_at(written + 1800.0).is_none());
    }

    #[test]
    fn garbage_timestamp_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir, Duration::from_secs(1800));
        std::fs::write(cache.path(), "not-a-number\nk:v\n").unwrap();
        assert!(cache.load().is_none());
    }
}
