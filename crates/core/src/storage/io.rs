//! # IO Utilities
//!
//! Location of the `.pokedex` runtime directory that holds the database,
//! the optional `config.json`, and the optional `.env`.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Env var that relocates the runtime directory
pub const RUNTIME_PATH_ENV: &str = "POKEDEX_RUNTIME_PATH";

/// Get the runtime directory path (.pokedex)
pub fn get_runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var(RUNTIME_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".pokedex")
}

/// Read a file under the runtime directory; `None` when it does not exist
pub async fn read_runtime_file(name: impl AsRef<Path>) -> Result<Option<String>> {
    let path = get_runtime_path().join(name);
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", path)),
    }
}

/// Write a file under the runtime directory, creating the directory first.
/// Returns the full path written.
pub async fn save_runtime_file(name: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
    let path = get_runtime_path().join(name);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {:?}", dir))?;
    }

    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}
