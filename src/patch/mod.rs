//! Version-keyed patch scripts.
//!
//! The bundled scripts replace a game's `main.js` to reroute its
//! browser-local save storage through the server's save endpoints. A
//! patch only applies to the exact engine build it was written for, so
//! the registry is keyed by a content hash of the target file: hash the
//! on-disk `main.js`, look up the key, and serve the patch on a hit or
//! the untouched original on a miss.

use std::collections::HashMap;

/// Registry of patch scripts keyed by target-file content hash.
pub struct PatchSet {
    scripts: HashMap<String, String>,
}

impl PatchSet {
    /// Empty registry.
    pub fn new() -> Self {
        PatchSet {
            scripts: HashMap::new(),
        }
    }

    /// Registry of the patches bundled into the binary.
    pub fn builtin() -> Self {
        let mut set = PatchSet::new();
        set.register(
            "dcab1427".to_string(),
            include_str!("../../patches/main.dcab1427.patch.js").to_string(),
        );
        set
    }

    /// Key for a file's content: first 8 hex chars of its MD5 digest.
    pub fn hash_key(content: &[u8]) -> String {
        let digest = format!("{:x}", md5::compute(content));
        digest[..8].to_string()
    }

    /// Register a patch under a hash key.
    pub fn register(&mut self, key: String, script: String) {
        self.scripts.insert(key, script);
    }

    /// Look up a patch by hash key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.scripts.get(key).map(String::as_str)
    }

    /// Look up the patch matching a target file's content.
    pub fn for_content(&self, content: &[u8]) -> Option<&str> {
        self.get(&Self::hash_key(content))
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl Default for PatchSet {
    fn default() -> Self {
        Self::new()
    }
}
