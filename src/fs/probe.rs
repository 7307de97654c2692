use std::path::Path;

/// True when `path` names an existing regular file. Follows symlinks;
/// any I/O error, including permission denied, reads as "no".
pub async fn is_existing_file(path: impl AsRef<Path>) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}

/// True when `path` names an existing directory. Same error policy as
/// [`is_existing_file`].
pub async fn is_existing_dir(path: impl AsRef<Path>) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_dir(),
        Err(_) => false,
    }
}

/// True when `path` names an existing file or directory.
pub async fn is_existing(path: impl AsRef<Path>) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.is_file() || meta.is_dir(),
        Err(_) => false,
    }
}
