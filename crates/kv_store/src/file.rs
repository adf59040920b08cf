//! File-backed key-value store.
//!
//! Each key is stored in its own file under a data directory. Key names are
//! percent-encoded, dots included, so that any string maps to a single safe
//! file name. Values are written to a temporary file first and renamed into
//! place; temporary names contain a dot and so never collide with a key.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{KeyValueStore, StorageResult};

const TEMP_SUFFIX: &str = ".tmp";

/// Key-value store persisting one file per key.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened file storage");
        Ok(Self { dir })
    }

    /// Returns the data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(encode_key(key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let temp = self
            .dir
            .join(format!("{}.{}{}", encode_key(key), Uuid::new_v4(), TEMP_SUFFIX));

        tokio::fs::write(&temp, value).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()), // Already removed
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.contains('.') {
                continue;
            }
            match urlencoding::decode(name) {
                Ok(key) => keys.push(key.into_owned()),
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "Skipping unrecognized file in storage")
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Maps a key to a file name.
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).replace('.', "%2E")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("users_storage_key"), "users_storage_key");
        assert_eq!(encode_key("a/b.c"), "a%2Fb%2Ec");
        assert_eq!(encode_key(".."), "%2E%2E");
    }

    #[tokio::test]
    async fn test_keys_round_trip_unusual_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path()).await.unwrap();

        let names = ["a/b.c", "é@x", "%41", "draft.tmp", ".."];
        for key in names {
            store.set_item(key, key).await.unwrap();
        }

        let mut expected: Vec<String> = names.iter().map(|k| k.to_string()).collect();
        expected.sort();
        assert_eq!(store.keys().await.unwrap(), expected);
        for key in names {
            assert_eq!(store.get_item(key).await.unwrap().as_deref(), Some(key));
        }
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileKeyValueStore::open(dir.path()).await.unwrap();
        store.set_item("current_user", r#"{"id":"u1"}"#).await.unwrap();
        store.set_item("favorites_storage_key_u1", "[]").await.unwrap();

        let reopened = FileKeyValueStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get_item("current_user").await.unwrap(),
            Some(r#"{"id":"u1"}"#.to_string())
        );
        assert_eq!(
            reopened.keys().await.unwrap(),
            vec!["current_user", "favorites_storage_key_u1"]
        );
    }

    #[tokio::test]
    async fn test_file_store_overwrite_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("nested")).await.unwrap();

        store.set_item("k", "1").await.unwrap();
        store.set_item("k", "2").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), Some("2".to_string()));

        store.remove_item("k").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert!(store.get_item("k").await.unwrap().is_none());
        assert!(store.keys().await.unwrap().is_empty());
    }
}
