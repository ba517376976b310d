//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせて画面側のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **DragStore**: ボード間ドラッグの楽観的更新とロールバック
//! - **KanbanBoard**: プロジェクトとボードの読み込み、ドラッグの入口
//! - **SwrCache**: stale-while-revalidate 用の永続キャッシュ
//! - **CachedView**: 一覧画面がキャッシュを使う手順
//! - **config**: 既定値（キャッシュの namespace、鮮度、失敗通知の文言）

pub mod cache_keys;
pub mod cached_view;
pub mod config;
pub mod drag_store;
pub mod kanban;
pub mod swr_cache;

// 主要な型を再エクスポート
pub use self::cached_view::CachedView;
pub use self::config::{BoardConfig, CacheConfig};
pub use self::drag_store::{DragOutcome, DragSkip, DragStore, PendingMove};
pub use self::kanban::{Column, KanbanBoard};
pub use self::swr_cache::{CacheEntry, SwrCache};
