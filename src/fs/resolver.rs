//! Case-insensitive path resolution.
//!
//! Game folders travel through filesystems with different case rules, so
//! the casing baked into asset URLs frequently disagrees with the casing
//! on disk. The resolver maps a requested path to the real entry by
//! walking the tree one segment at a time and matching each segment
//! case-insensitively against the directory's actual children.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use log::debug;
use percent_encoding::percent_decode_str;

use super::probe::{is_existing, is_existing_file};
use crate::cache::PathCache;

/// Resolves request paths against the real filesystem.
pub struct Resolver {
    /// Anchor for relative inputs (the game directory at runtime).
    base: PathBuf,
}

impl Resolver {
    pub fn new(base: PathBuf) -> Self {
        Resolver { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolve a path to its canonical on-disk casing.
    ///
    /// The input may be percent-encoded, relative, and cased arbitrarily;
    /// each segment is matched independently, so an input with every
    /// segment's case mangled still resolves. Returns `None` when no
    /// entry matches. Decode and I/O failures also resolve to `None`:
    /// the caller only ever sees found / not found.
    pub async fn resolve_path(&self, target: &str) -> Option<PathBuf> {
        let wanted = self.normalize(target)?;

        // Fast path: the exact casing exists on disk.
        if is_existing(&wanted).await {
            return Some(wanted);
        }

        // Split into the root anchor and the segments below it.
        let mut resolved = PathBuf::new();
        let mut segments = Vec::new();
        for comp in wanted.components() {
            match comp {
                Component::Normal(name) => segments.push(name.to_os_string()),
                other => resolved.push(other),
            }
        }

        // The input was the bare filesystem root and the fast path
        // already said it is not there.
        if segments.is_empty() {
            return None;
        }
        if !is_existing(&resolved).await {
            return None;
        }

        // Walk down from the root. An unresolvable ancestor fails the
        // whole path; one iteration per segment, so the walk always
        // terminates.
        for segment in &segments {
            let exact = resolved.join(segment);
            if is_existing(&exact).await {
                resolved = exact;
                continue;
            }
            resolved = match_segment(&resolved, segment).await?;
        }

        Some(resolved)
    }

    /// Resolve a path and require the result to be a regular file.
    pub async fn resolve_file(&self, target: &str) -> Option<PathBuf> {
        let found = self.resolve_path(target).await?;
        if is_existing_file(&found).await {
            Some(found)
        } else {
            None
        }
    }

    /// Cached [`Resolver::resolve_file`].
    ///
    /// Keyed by the raw request string, before decoding or normalization.
    /// Only successful file resolutions are stored; misses re-walk the
    /// filesystem on every call.
    pub async fn lookup(&self, cache: &PathCache, target: &str) -> Option<PathBuf> {
        if let Some(hit) = cache.get(target) {
            return Some(hit);
        }

        let found = self.resolve_file(target).await?;
        cache.put(target.to_string(), found.clone());
        Some(found)
    }

    /// Percent-decode, absolutize against the base, and lexically
    /// normalize. No filesystem access. `None` when the decoded bytes
    /// are not valid UTF-8.
    fn normalize(&self, target: &str) -> Option<PathBuf> {
        let decoded = match percent_decode_str(target).decode_utf8() {
            Ok(s) => s,
            Err(err) => {
                debug!("undecodable path {:?}: {}", target, err);
                return None;
            }
        };

        let raw = Path::new(decoded.as_ref());
        let joined = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.base.join(raw)
        };

        let mut normalized = PathBuf::new();
        for comp in joined.components() {
            match comp {
                Component::CurDir => {}
                // pop() is a no-op at the root, so ".." cannot climb
                // above it
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other),
            }
        }

        Some(normalized)
    }
}

/// Find the child of `dir` whose name matches `segment` under Unicode
/// case folding. First match in directory order wins; enumeration
/// failures read as "no match".
async fn match_segment(dir: &Path, segment: &OsStr) -> Option<PathBuf> {
    let wanted = segment.to_str()?.to_lowercase();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot enumerate {}: {}", dir.display(), err);
            return None;
        }
    };

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let name = entry.file_name();
                if let Some(name_str) = name.to_str() {
                    if name_str.to_lowercase() == wanted {
                        return Some(dir.join(name));
                    }
                }
            }
            Ok(None) => return None,
            Err(err) => {
                debug!("error enumerating {}: {}", dir.display(), err);
                return None;
            }
        }
    }
}
