//! Whole-state snapshot file used by the snapshot-file store.
//!
//! The file holds one JSON document that is rewritten in full on every
//! mutation. The format is private to this crate.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Location of a snapshot on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot.
    ///
    /// A missing or empty file yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if the file cannot be read or does
    /// not decode.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Replaces the snapshot with `value`.
    ///
    /// Writes a sibling temporary file first and renames it over the target,
    /// so a crash mid-write leaves the previous snapshot intact.
    pub async fn write<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("links.json"));

        let loaded: Option<HashMap<String, String>> = snapshot.load().await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_empty_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, b"").unwrap();

        let loaded: Option<HashMap<String, String>> =
            SnapshotFile::new(&path).load().await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("links.json"));

        let mut data = HashMap::new();
        data.insert("k".to_string(), "v".to_string());
        snapshot.write(&data).await.unwrap();

        let loaded: HashMap<String, String> = snapshot.load().await.unwrap().unwrap();
        assert_eq!(loaded, data);
        assert!(!dir.path().join("links.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result: Result<Option<HashMap<String, String>>, _> =
            SnapshotFile::new(&path).load().await;
        assert!(matches!(result, Err(StoreError::Internal(_))));
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("missing").join("links.json"));

        let result = snapshot.write(&HashMap::<String, String>::new()).await;
        assert!(matches!(result, Err(StoreError::Internal(_))));
    }
}
