//! FileKeyValueStore - JSON ファイルに保存する永続 key/value ストア
//!
//! CLI で使う「再起動しても残る」ストア。1 ファイルに全キーを
//! JSON オブジェクトとして保存し、書き込みは一時ファイル経由で置き換える。
//!
//! 壊れたファイルは読み出しではエラー、書き込みでは空として上書きする。

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::StorageError;
use crate::ports::KeyValueStore;

pub struct FileKeyValueStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Result<R, StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("lock poisoned: {e}")))?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(err)) => {
                tracing::warn!(path = %self.path.display(), error = %err, "store file is corrupt, rewriting it");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        let out = f(&mut entries);
        self.save(&entries)?;
        Ok(out)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.load()?.into_keys().collect())
    }

    fn remove_prefix(&self, prefix: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.retain(|key, _| !key.starts_with(prefix)))
    }
}
