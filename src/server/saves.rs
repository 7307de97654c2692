use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;

use crate::fs::is_existing_file;

/// File name for persisted save data, created inside the game directory.
pub const SAVE_FILE: &str = "gameden.json";

/// Persistence for the served game's save data. The blob is opaque: it
/// is written and returned verbatim.
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(dir: &Path) -> Self {
        SaveStore {
            path: dir.join(SAVE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the save file with `data`.
    pub async fn save(&self, data: &[u8]) -> Result<()> {
        tokio::fs::write(&self.path, data)
            .await
            .with_context(|| format!("failed to write save data to {}", self.path.display()))
    }

    /// Contents of the save file, or `None` when no save exists yet.
    pub async fn load(&self) -> Result<Option<Bytes>> {
        if !is_existing_file(&self.path).await {
            return Ok(None);
        }

        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read save data from {}", self.path.display()))?;
        Ok(Some(Bytes::from(data)))
    }
}
