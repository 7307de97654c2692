use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Memoization table for resolved file paths.
///
/// Keyed by the original request string, valued by the canonical on-disk
/// path. Entries are written once and never evicted; the table lives for
/// the server process and assumes the filesystem does not change the
/// casing of existing entries underneath it. Concurrent writers racing
/// on the same key store the same value, so no coordination beyond the
/// lock is needed.
pub struct PathCache {
    store: Arc<RwLock<HashMap<String, PathBuf>>>,
}

impl PathCache {
    pub fn new() -> Self {
        PathCache {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get a cached resolution, if any. A poisoned lock reads as a miss.
    pub fn get(&self, key: &str) -> Option<PathBuf> {
        let store = self.store.read().ok()?;
        store.get(key).cloned()
    }

    /// Store a resolution.
    pub fn put(&self, key: String, path: PathBuf) {
        if let Ok(mut store) = self.store.write() {
            store.insert(key, path);
        }
    }

    /// Number of cached resolutions.
    pub fn len(&self) -> usize {
        self.store.read().ok().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PathCache {
    fn clone(&self) -> Self {
        PathCache {
            store: Arc::clone(&self.store),
        }
    }
}
