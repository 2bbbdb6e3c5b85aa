use std::{ffi::OsString, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{CollectionStorage, StorageError};
use crate::record::Record;

/// One collection persisted as a pretty-printed JSON array.
///
/// Writes go to a sibling `<file>.tmp` which is then renamed over the target,
/// so readers see either the previous or the new array, never a prefix.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    file_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("collection"));
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }

    fn write_err(&self, e: impl ToString) -> StorageError {
        StorageError::Write { location: self.location(), message: e.to_string() }
    }
}

#[async_trait]
impl CollectionStorage for JsonFileStorage {
    async fn load(&self) -> Result<Vec<Record>, StorageError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::Read { location: self.location(), message: e.to_string() })
            }
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Parse { location: self.location(), message: e.to_string() })
    }

    async fn save(&self, records: &[Record]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|e| StorageError::Encode { location: self.location(), message: e.to_string() })?;
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.write_err(e))?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, &data).await.map_err(|e| self.write_err(e))?;
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.write_err(e));
        }
        debug!(location = %self.file_path.display(), count = records.len(), bytes = data.len(), "collection written");
        Ok(())
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn tmp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_file_storage_{}", Uuid::new_v4()))
            .join(format!("{tag}.json"))
    }

    fn record(v: serde_json::Value) -> Record {
        serde_json::from_value(v).unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_empty_collection() -> Result<(), anyhow::Error> {
        let path = tmp_file("missing");
        let storage = JsonFileStorage::new(&path);
        assert!(storage.load().await?.is_empty());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn save_writes_pretty_array_and_reloads() -> Result<(), anyhow::Error> {
        let path = tmp_file("users");
        let storage = JsonFileStorage::new(&path);
        let records = vec![record(json!({"id": 1, "name": "Ann"})), record(json!({"id": 2, "name": "Bo"}))];
        storage.save(&records).await?;

        let text = tokio::fs::read_to_string(&path).await?;
        assert!(text.starts_with("[\n  {\n    \"id\": 1,"), "unexpected layout: {text}");
        assert!(!storage.tmp_path().exists());

        let reloaded = JsonFileStorage::new(&path).load().await?;
        assert_eq!(reloaded, records);

        storage.save(&[]).await?;
        assert_eq!(tokio::fs::read_to_string(&path).await?, "[]");

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn garbage_is_parse_error() -> Result<(), anyhow::Error> {
        let path = tmp_file("roles");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&path, b"{not json").await?;
        let err = JsonFileStorage::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));

        tokio::fs::write(&path, b"{\"id\": 1}").await?;
        let err = JsonFileStorage::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn unwritable_target_is_write_error() -> Result<(), anyhow::Error> {
        let dir = tmp_file("blocker");
        // a directory where the file should go makes the rename fail
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("inner"), b"x").await?;
        let err = JsonFileStorage::new(&dir).save(&[]).await.unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap()).await;
        Ok(())
    }
}
