//! TaskService port - REST API のタスク系エンドポイント
//!
//! ボード画面が使う呼び出しだけを切り出しています。
//! - `GET  /projects/{id}`
//! - `GET  /boards/{id}/tasks`
//! - `PUT  /tasks/{id}/move`      （列をまたぐ移動）
//! - `PUT  /tasks/{id}/position`  （同じ列内での並び替え）
//!
//! リクエスト/レスポンスの詳細は API 側の責務です。

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{BoardId, Project, ProjectId, ServiceError, Task, TaskId};

/// TaskService はサーバー側の正本（source of truth）への窓口
///
/// # 設計原則
/// - クライアント側の `DragStore` はサーバー状態の「推測」に過ぎない
/// - エラーの種類は区別せず、move の失敗はすべて「拒否」として扱う
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn fetch_project(&self, project_id: ProjectId) -> Result<Project, ServiceError>;

    /// Tasks currently on `board_id`, in whatever order the server returns.
    async fn fetch_board_tasks(&self, board_id: BoardId) -> Result<Vec<Task>, ServiceError>;

    /// The authoritative cross-board move.
    async fn move_task(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        position: i32,
    ) -> Result<Task, ServiceError>;

    /// Reorder within the task's current board.
    async fn reorder_task(&self, task_id: TaskId, position: i32) -> Result<Task, ServiceError>;
}

#[async_trait]
impl<S: TaskService + ?Sized> TaskService for Arc<S> {
    async fn fetch_project(&self, project_id: ProjectId) -> Result<Project, ServiceError> {
        (**self).fetch_project(project_id).await
    }

    async fn fetch_board_tasks(&self, board_id: BoardId) -> Result<Vec<Task>, ServiceError> {
        (**self).fetch_board_tasks(board_id).await
    }

    async fn move_task(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        position: i32,
    ) -> Result<Task, ServiceError> {
        (**self).move_task(task_id, board_id, position).await
    }

    async fn reorder_task(&self, task_id: TaskId, position: i32) -> Result<Task, ServiceError> {
        (**self).reorder_task(task_id, position).await
    }
}
