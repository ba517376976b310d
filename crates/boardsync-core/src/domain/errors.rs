//! Errors - エラー型と分類
//!
//! 外部との境界ごとに thiserror の enum を 1 つ持ちます。
//! - ServiceError: REST API（task move / fetch）
//! - StorageError: 永続 key/value ストア（キャッシュの保存先）

use thiserror::Error;

/// ErrorKind は失敗の運用分類
///
/// - Transient: ネットワーク断など、再試行で通る可能性がある
/// - Permanent: サーバーが拒否した（404, 400, 403 など）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
}

/// Failure of a call to the task service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by server: {0}")]
    Rejected(String),

    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network failure: {0}")]
    Network(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Network(_) => ErrorKind::Transient,
            ServiceError::Http { status, .. } if *status >= 500 => ErrorKind::Transient,
            _ => ErrorKind::Permanent,
        }
    }
}

/// Failure of the durable key/value store behind the cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded ({used} of {quota} bytes)")]
    QuotaExceeded { used: usize, quota: usize },

    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
