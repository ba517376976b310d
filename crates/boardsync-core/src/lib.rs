//! boardsync-core
//!
//! Client-side state for the dashboard's project boards and list views.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, board/project, role, errors）
//! - **ports**: 抽象化レイヤー（TaskService, KeyValueStore, Notifier, Clock, IdGenerator）
//! - **app**: 画面側のロジック（DragStore, KanbanBoard, SwrCache, CachedView）
//! - **impls**: 実装（インメモリ/ファイルのストア、インメモリの API、通知）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{
    BoardConfig, CacheConfig, CachedView, DragOutcome, DragSkip, DragStore, KanbanBoard, SwrCache,
};
