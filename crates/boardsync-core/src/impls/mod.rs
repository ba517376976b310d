//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryKeyValueStore**: テスト用のストア（quota / 利用不可を再現できる）
//! - **FileKeyValueStore**: JSON ファイルに永続化するストア（CLI 用）
//! - **InMemoryTaskService**: REST API の代替（失敗注入つき）
//! - **TracingNotifier / RecordingNotifier**: 失敗通知
//!
//! 本番の HTTP クライアント実装はこのクレートの外に置きます。

pub mod file_kv;
pub mod inmem_kv;
pub mod inmem_task_service;
pub mod notifier;

// 主要な型を再エクスポート
pub use self::file_kv::FileKeyValueStore;
pub use self::inmem_kv::InMemoryKeyValueStore;
pub use self::inmem_task_service::InMemoryTaskService;
pub use self::notifier::{RecordingNotifier, TracingNotifier};
