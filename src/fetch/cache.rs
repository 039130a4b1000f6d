//! File-based response cache with mtime-derived TTL.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::trace;

use crate::error::{EolScanError, FetchErrorKind, Result};

/// Caches serialized API responses under the platform cache directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    bypass: bool,
}

impl FileCache {
    /// Cache rooted at `<platform cache dir>/eolscan/<namespace>`.
    #[must_use]
    pub fn new(namespace: &str, ttl: Duration) -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("eolscan")
            .join(namespace);
        Self {
            dir,
            ttl,
            bypass: false,
        }
    }

    /// Cache rooted at an explicit directory, for tests.
    #[must_use]
    pub fn at(dir: PathBuf, ttl: Duration) -> Self {
        Self {
            dir,
            ttl,
            bypass: false,
        }
    }

    /// Skip reads so every lookup refetches; writes still happen.
    #[must_use]
    pub fn bypassed(mut self) -> Self {
        self.bypass = true;
        self
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let safe_key = key.replace(['/', ':'], "_");
        self.dir.join(format!("{safe_key}.json"))
    }

    fn is_fresh(&self, key: &str) -> bool {
        if self.bypass {
            return false;
        }
        let path = self.entry_path(key);
        fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|elapsed| elapsed < self.ttl)
    }

    /// Load a cached value if present and within TTL.
    #[must_use]
    pub fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.is_fresh(key) {
            return None;
        }
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let value = serde_json::from_str(&content).ok();
        if value.is_some() {
            trace!(key, "cache hit");
        }
        value
    }

    /// Persist a value. Failure to cache is an error the caller may choose
    /// to ignore; the fetched value itself is already in hand.
    pub fn store<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| EolScanError::fetch("creating cache dir", FetchErrorKind::CacheError(e.to_string())))?;
        let content = serde_json::to_string(value)
            .map_err(|e| EolScanError::fetch("serializing cache entry", FetchErrorKind::CacheError(e.to_string())))?;
        fs::write(self.entry_path(key), content)
            .map_err(|e| EolScanError::fetch("writing cache entry", FetchErrorKind::CacheError(e.to_string())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::at(dir.path().to_path_buf(), Duration::from_secs(60));
        cache.store("python", &vec!["3.12".to_string()]).unwrap();
        let loaded: Vec<String> = cache.load("python").unwrap();
        assert_eq!(loaded, vec!["3.12".to_string()]);
    }

    #[test]
    fn test_expired_entry_misses() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::at(dir.path().to_path_buf(), Duration::ZERO);
        cache.store("python", &1_u32).unwrap();
        assert!(cache.load::<u32>("python").is_none());
    }

    #[test]
    fn test_bypass_skips_reads() {
        let dir = TempDir::new().unwrap();
        let cache =
            FileCache::at(dir.path().to_path_buf(), Duration::from_secs(60)).bypassed();
        cache.store("key", &1_u32).unwrap();
        assert!(cache.load::<u32>("key").is_none());
    }

    #[test]
    fn test_key_sanitization() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::at(dir.path().to_path_buf(), Duration::from_secs(60));
        cache.store("pypi:requests/2", &2_u32).unwrap();
        assert_eq!(cache.load::<u32>("pypi:requests/2"), Some(2));
        assert!(dir.path().join("pypi_requests_2.json").exists());
    }
}
