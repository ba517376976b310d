//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部（REST API, 永続ストレージ, 通知 UI, 時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - REST API が source of truth（正本）
//! - クライアントの状態はすべて API から再構築できる
//! - key/value ストアはキャッシュ専用（消えても困らない）

pub mod clock;
pub mod id_generator;
pub mod kv_store;
pub mod notifier;
pub mod task_service;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::kv_store::KeyValueStore;
pub use self::notifier::Notifier;
pub use self::task_service::TaskService;
