//! KanbanBoard - プロジェクト詳細画面のボード部分
//!
//! プロジェクトを取得し、ボードごとにタスクを取得して `DragStore` に積む。
//! ドラッグ操作は `DragStore` に委譲する。

use crate::app::config::BoardConfig;
use crate::app::drag_store::{DragOutcome, DragStore};
use crate::domain::{Board, BoardId, Project, ProjectId, ServiceError, Task, TaskId};
use crate::ports::{Notifier, TaskService};

/// One rendered column: the board and its tasks in display order.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub board: &'a Board,
    pub tasks: &'a [Task],
}

pub struct KanbanBoard<S> {
    service: S,
    project: Option<Project>,
    store: DragStore,
}

impl<S: TaskService> KanbanBoard<S> {
    pub fn new(service: S, config: BoardConfig) -> Self {
        Self {
            service,
            project: None,
            store: DragStore::new(config),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn store(&self) -> &DragStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DragStore {
        &mut self.store
    }

    /// Fetch the project, then each board's tasks in column order.
    ///
    /// The store is rebuilt from scratch. A board whose fetch fails stays
    /// unloaded; drags from it are ignored until the next reload.
    /// Returns the number of boards loaded.
    pub async fn load_project(&mut self, project_id: ProjectId) -> Result<usize, ServiceError> {
        let project = self.service.fetch_project(project_id).await.inspect_err(|err| {
            tracing::warn!(%project_id, error = %err, "failed to fetch project");
        })?;

        self.store.clear();
        let mut loaded = 0;
        for board in project.boards_in_order() {
            match self.service.fetch_board_tasks(board.id).await {
                Ok(tasks) => {
                    self.store.load_board(board.id, tasks);
                    loaded += 1;
                }
                Err(err) => {
                    tracing::warn!(board_id = %board.id, error = %err, "failed to load board tasks");
                }
            }
        }
        tracing::info!(%project_id, boards = loaded, "project loaded");

        self.project = Some(project);
        Ok(loaded)
    }

    /// Full refresh after create/update elsewhere on the page.
    pub async fn refresh(&mut self) -> Result<usize, ServiceError> {
        match self.project.as_ref().map(|p| p.id) {
            Some(project_id) => self.load_project(project_id).await,
            None => Ok(0),
        }
    }

    /// Columns in board order. Boards that failed to load render empty.
    pub fn columns(&self) -> Vec<Column<'_>> {
        let Some(project) = &self.project else {
            return Vec::new();
        };
        project
            .boards_in_order()
            .into_iter()
            .map(|board| Column {
                board,
                tasks: self.store.board_tasks(board.id),
            })
            .collect()
    }

    pub fn begin_drag(&mut self, task_id: TaskId) -> Option<&Task> {
        self.store.begin_drag(task_id)
    }

    pub fn cancel_drag(&mut self) {
        self.store.cancel_drag();
    }

    /// Drop `task_id` onto the column `target`.
    pub async fn drop_on<N>(&mut self, task_id: TaskId, target: BoardId, notifier: &N) -> DragOutcome
    where
        N: Notifier + ?Sized,
    {
        self.store
            .complete_drag(task_id, target, &self.service, notifier)
            .await
    }

    /// Drop `task_id` at `index` inside its own column.
    pub async fn drop_within<N>(&mut self, task_id: TaskId, index: usize, notifier: &N) -> DragOutcome
    where
        N: Notifier + ?Sized,
    {
        self.store
            .reorder_within_board(task_id, index, &self.service, notifier)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::drag_store::DragSkip;
    use crate::domain::ProjectStatus;
    use crate::impls::{InMemoryTaskService, RecordingNotifier};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use ulid::Ulid;

    struct Fixture {
        service: Arc<InMemoryTaskService>,
        project_id: ProjectId,
        todo: BoardId,
        done: BoardId,
        t1: Task,
        t2: Task,
    }

    async fn fixture() -> Fixture {
        let service = Arc::new(InMemoryTaskService::new());
        let project_id = ProjectId::from_ulid(Ulid::new());
        let board = |name: &str, position: i32| Board {
            id: BoardId::from_ulid(Ulid::new()),
            project_id,
            name: name.to_string(),
            position,
            color: "#64748b".to_string(),
        };
        // listed out of order on purpose
        let done = board("Done", 1);
        let todo = board("Todo", 0);
        let (todo_id, done_id) = (todo.id, done.id);
        service
            .insert_project(Project {
                id: project_id,
                name: "Office move".to_string(),
                description: None,
                start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                end_date: None,
                status: ProjectStatus::Active,
                members: vec![],
                boards: vec![done, todo],
            })
            .await;
        let t2 = Task::new(TaskId::from_ulid(Ulid::new()), todo_id, "Pack desks", 1);
        let t1 = Task::new(TaskId::from_ulid(Ulid::new()), todo_id, "Book van", 0);
        service.insert_task(t2.clone()).await;
        service.insert_task(t1.clone()).await;

        Fixture {
            service,
            project_id,
            todo: todo_id,
            done: done_id,
            t1,
            t2,
        }
    }

    #[tokio::test]
    async fn load_project_fills_columns_in_board_order() {
        let fx = fixture().await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());

        let loaded = kanban.load_project(fx.project_id).await.unwrap();

        assert_eq!(loaded, 2);
        let columns = kanban.columns();
        let names: Vec<&str> = columns.iter().map(|c| c.board.name.as_str()).collect();
        assert_eq!(names, vec!["Todo", "Done"]);
        let todo_ids: Vec<TaskId> = columns[0].tasks.iter().map(|t| t.id).collect();
        assert_eq!(todo_ids, vec![fx.t1.id, fx.t2.id]);
        assert!(columns[1].tasks.is_empty());
    }

    #[tokio::test]
    async fn drop_on_other_column_moves_locally_and_on_server() {
        let fx = fixture().await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());
        kanban.load_project(fx.project_id).await.unwrap();
        let notifier = RecordingNotifier::new();

        kanban.begin_drag(fx.t1.id);
        let outcome = kanban.drop_on(fx.t1.id, fx.done, &notifier).await;

        assert_eq!(outcome, DragOutcome::Moved);
        assert!(kanban.store().active_task().is_none());
        assert_eq!(kanban.store().board_of(fx.t1.id), Some(fx.done));
        let server = fx.service.task(fx.t1.id).await.unwrap();
        assert_eq!(server.board_id, fx.done);
        assert_eq!(server.position, 0);
    }

    #[tokio::test]
    async fn drop_on_same_column_sends_nothing() {
        let fx = fixture().await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());
        kanban.load_project(fx.project_id).await.unwrap();
        let notifier = RecordingNotifier::new();

        let outcome = kanban.drop_on(fx.t1.id, fx.todo, &notifier).await;

        assert_eq!(outcome, DragOutcome::Skipped(DragSkip::SameBoard(fx.t1.id)));
        assert_eq!(fx.service.move_calls(), 0);
    }

    #[tokio::test]
    async fn refresh_rebuilds_from_server_truth() {
        let fx = fixture().await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());
        kanban.load_project(fx.project_id).await.unwrap();

        // optimistic move that never reaches the server
        let pending = kanban.store_mut().apply_move(fx.t2.id, fx.done).unwrap();
        kanban.store_mut().abandon(pending);
        assert_eq!(kanban.store().board_of(fx.t2.id), Some(fx.done));
        assert!(!kanban.store().has_pending(fx.t2.id));

        kanban.refresh().await.unwrap();
        assert_eq!(kanban.store().board_of(fx.t2.id), Some(fx.todo));
    }

    async fn with_third_task(fx: &Fixture) -> Task {
        let t3 = Task::new(TaskId::from_ulid(Ulid::new()), fx.todo, "Return keys", 2);
        fx.service.insert_task(t3.clone()).await;
        t3
    }

    fn todo_order(kanban: &KanbanBoard<Arc<InMemoryTaskService>>, todo: BoardId) -> Vec<TaskId> {
        kanban.store().board_tasks(todo).iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn reorder_survives_a_reload() {
        let fx = fixture().await;
        let t3 = with_third_task(&fx).await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());
        kanban.load_project(fx.project_id).await.unwrap();
        let notifier = RecordingNotifier::new();

        let outcome = kanban.drop_within(fx.t1.id, 2, &notifier).await;

        assert_eq!(outcome, DragOutcome::Moved);
        let shown = todo_order(&kanban, fx.todo);
        assert_eq!(shown, vec![fx.t2.id, t3.id, fx.t1.id]);
        kanban.refresh().await.unwrap();
        assert_eq!(todo_order(&kanban, fx.todo), shown);
    }

    #[tokio::test]
    async fn reorder_without_a_free_position_shows_the_server_order() {
        let fx = fixture().await;
        let t3 = with_third_task(&fx).await;
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());
        kanban.load_project(fx.project_id).await.unwrap();
        let notifier = RecordingNotifier::new();

        // neighbours sit at 0 and 1, nothing fits between them
        let outcome = kanban.drop_within(t3.id, 1, &notifier).await;

        assert_eq!(outcome, DragOutcome::Moved);
        assert_eq!(fx.service.task(t3.id).await.unwrap().position, 1);
        let shown = todo_order(&kanban, fx.todo);
        kanban.refresh().await.unwrap();
        assert_eq!(todo_order(&kanban, fx.todo), shown);
        assert!(!kanban.store().has_pending(t3.id));
    }

    #[tokio::test]
    async fn failed_project_fetch_is_returned() {
        let fx = fixture().await;
        fx.service.set_offline(true);
        let mut kanban = KanbanBoard::new(fx.service.clone(), BoardConfig::default());

        assert!(kanban.load_project(fx.project_id).await.is_err());
        assert!(kanban.columns().is_empty());
    }
}
