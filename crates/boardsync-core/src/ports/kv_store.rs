//! KeyValueStore port - 永続 key/value ストア
//!
//! ブラウザの localStorage に相当するもの。文字列 → 文字列で、
//! プロセスを再起動しても残る。ただしベストエフォートで、
//! いつでも失敗しうる（容量超過、利用不可など）。

use std::sync::Arc;

use crate::domain::StorageError;

/// KeyValueStore はキャッシュの保存先
///
/// 同期 API。UI スレッドから直接呼ばれる想定なので、重い処理は置かない。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Remove every key starting with `prefix`.
    fn remove_prefix(&self, prefix: &str) -> Result<(), StorageError> {
        for key in self.keys()? {
            if key.starts_with(prefix) {
                self.remove(&key)?;
            }
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }

    fn remove_prefix(&self, prefix: &str) -> Result<(), StorageError> {
        (**self).remove_prefix(prefix)
    }
}
