//! InMemoryTaskService - 開発用の REST API 代替
//!
//! サーバー側の move 検証（タスク存在、移動先ボード存在、同一プロジェクト）を
//! 再現し、失敗の注入と呼び出し回数の観測ができる。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Board, BoardId, Project, ProjectId, ServiceError, Task, TaskId};
use crate::ports::TaskService;

#[derive(Default)]
struct ServiceState {
    projects: HashMap<ProjectId, Project>,
    /// Insertion order is the order `fetch_board_tasks` returns.
    tasks: Vec<Task>,
}

impl ServiceState {
    fn board(&self, board_id: BoardId) -> Option<&Board> {
        self.projects
            .values()
            .flat_map(|p| p.boards.iter())
            .find(|b| b.id == board_id)
    }

    fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

#[derive(Default)]
pub struct InMemoryTaskService {
    state: Mutex<ServiceState>,
    failing_moves: AtomicUsize,
    offline: AtomicBool,
    move_calls: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryTaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub async fn insert_project(&self, project: Project) {
        self.state.lock().await.projects.insert(project.id, project);
    }

    pub async fn insert_task(&self, task: Task) {
        let mut state = self.state.lock().await;
        state.tasks.retain(|t| t.id != task.id);
        state.tasks.push(task);
    }

    /// Server-side view of one task.
    pub async fn task(&self, task_id: TaskId) -> Option<Task> {
        self.state
            .lock()
            .await
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
    }

    /// The next `n` move/reorder calls fail with `ServiceError::Network`.
    pub fn fail_next_moves(&self, n: usize) {
        self.failing_moves.store(n, Ordering::SeqCst);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn move_calls(&self) -> usize {
        self.move_calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> Result<(), ServiceError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("service offline".to_string()));
        }
        Ok(())
    }

    fn take_injected_failure(&self) -> Result<(), ServiceError> {
        let injected = self
            .failing_moves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ServiceError::Network("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskService for InMemoryTaskService {
    async fn fetch_project(&self, project_id: ProjectId) -> Result<Project, ServiceError> {
        self.round_trip().await?;
        self.state
            .lock()
            .await
            .projects
            .get(&project_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))
    }

    async fn fetch_board_tasks(&self, board_id: BoardId) -> Result<Vec<Task>, ServiceError> {
        self.round_trip().await?;
        let state = self.state.lock().await;
        if state.board(board_id).is_none() {
            return Err(ServiceError::NotFound("Board not found".to_string()));
        }
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn move_task(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        position: i32,
    ) -> Result<Task, ServiceError> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        self.take_injected_failure()?;

        let mut state = self.state.lock().await;
        let old_board_id = state
            .tasks
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.board_id)
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;
        let new_project = state
            .board(board_id)
            .map(|b| b.project_id)
            .ok_or_else(|| ServiceError::NotFound("Target board not found".to_string()))?;
        let old_project = state.board(old_board_id).map(|b| b.project_id);
        if old_project != Some(new_project) {
            return Err(ServiceError::Rejected(
                "Cannot move task to a different project".to_string(),
            ));
        }

        let task = state
            .task_mut(task_id)
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;
        task.board_id = board_id;
        task.position = position;
        Ok(task.clone())
    }

    async fn reorder_task(&self, task_id: TaskId, position: i32) -> Result<Task, ServiceError> {
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        self.take_injected_failure()?;

        let mut state = self.state.lock().await;
        let task = state
            .task_mut(task_id)
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;
        task.position = position;
        Ok(task.clone())
    }
}
