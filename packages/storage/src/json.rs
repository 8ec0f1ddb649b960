use crate::StoreResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, warn};

/// Reads a JSON value from disk; a missing or unreadable file yields the default.
pub async fn read_or_default<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        debug!("No file at {:?}, starting empty", path);
        return Ok(T::default());
    }

    match fs::read_to_string(path).await {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                error!("Failed to parse {:?}: {}", path, e);
                warn!("Using default contents");
                Ok(T::default())
            }
        },
        Err(e) => {
            error!("Failed to read {:?}: {}", path, e);
            warn!("Using default contents");
            Ok(T::default())
        }
    }
}

/// Writes a JSON value to disk, creating parent directories as needed.
pub async fn write_pretty<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            debug!("Creating data directory: {:?}", parent);
            fs::create_dir_all(parent).await?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let items: Vec<String> = read_or_default(&dir.path().join("nope.json")).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let items: Vec<String> = read_or_default(&path).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("items.json");

        let items = vec!["a".to_string(), "b".to_string()];
        write_pretty(&path, &items).await.unwrap();

        let read: Vec<String> = read_or_default(&path).await.unwrap();
        assert_eq!(read, items);
    }
}
