//! DragStore - ボード間ドラッグの楽観的更新とロールバック
//!
//! `BoardId → 並び順つき Task 列` を持つ、サーバー状態の「推測」。
//!
//! # 流れ
//! 1. `apply_move`: 同期的にローカル状態を書き換える（画面は即座に反映）
//! 2. `PendingMove::dispatch`: サーバーへ move を送る（ここだけが await）
//! 3. `settle`: 成功なら何もしない、失敗なら 1 を巻き戻して通知
//!
//! `complete_drag` は 1〜3 をまとめて実行する。
//!
//! # 順序保証
//! 各 move にタスク単位の連番を振る。古い move の失敗応答が、
//! その後に発行された move より遅れて届いた場合は捨てる（`Superseded`）。

use std::collections::HashMap;

use crate::app::config::BoardConfig;
use crate::domain::{BoardId, ServiceError, Task, TaskId};
use crate::ports::{Notifier, TaskService};

/// Why a drop did not turn into a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DragSkip {
    #[error("task {0} is not on any loaded board")]
    TaskNotFound(TaskId),

    #[error("task {0} was dropped on its own board")]
    SameBoard(TaskId),

    #[error("task {0} was dropped at its current position")]
    SamePosition(TaskId),
}

/// What happened to one drag once it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The server accepted the move; local state was already correct.
    Moved,
    /// The server rejected the move and local state was reverted.
    RolledBack,
    /// A newer move of the same task was issued before this one settled.
    Superseded,
    /// Nothing was moved and no request was sent.
    Skipped(DragSkip),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveKind {
    Across { from: BoardId, to: BoardId },
    Reorder {
        board: BoardId,
        from_index: usize,
        /// `false` when no position sorts strictly between the new neighbours.
        exact: bool,
    },
}

/// Position for a task landing between `before` and `after`.
///
/// The server only stores the one position it is sent, so the value must
/// sort between the neighbours' existing positions. Returns `false` when
/// no such integer exists (e.g. neighbours at 1 and 2).
fn slot_position(before: Option<i32>, after: Option<i32>) -> (i32, bool) {
    match (before, after) {
        (None, None) => (0, true),
        (Some(b), None) => b.checked_add(1).map_or((b, false), |p| (p, true)),
        (None, Some(a)) => a.checked_sub(1).map_or((a, false), |p| (p, true)),
        (Some(b), Some(a)) => {
            let gap = i64::from(a) - i64::from(b);
            if gap >= 2 {
                (b + (gap / 2) as i32, true)
            } else {
                (a, false)
            }
        }
    }
}

/// An optimistic move that has been applied locally but not yet confirmed.
///
/// The store counts the task as pending until the move is passed to
/// `DragStore::settle` or `DragStore::abandon`, or the store is cleared.
#[derive(Debug, Clone)]
#[must_use = "a pending move must be dispatched and settled"]
pub struct PendingMove {
    seq: u64,
    /// The task exactly as it was before the move.
    original: Task,
    kind: MoveKind,
    position: i32,
}

impl PendingMove {
    pub fn task_id(&self) -> TaskId {
        self.original.id
    }

    pub fn source(&self) -> BoardId {
        match self.kind {
            MoveKind::Across { from, .. } => from,
            MoveKind::Reorder { board, .. } => board,
        }
    }

    pub fn target(&self) -> BoardId {
        match self.kind {
            MoveKind::Across { to, .. } => to,
            MoveKind::Reorder { board, .. } => board,
        }
    }

    /// Position sent to the server.
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Send the authoritative request for this move.
    pub async fn dispatch<S>(&self, service: &S) -> Result<Task, ServiceError>
    where
        S: TaskService + ?Sized,
    {
        match self.kind {
            MoveKind::Across { to, .. } => {
                service.move_task(self.task_id(), to, self.position).await
            }
            MoveKind::Reorder { .. } => service.reorder_task(self.task_id(), self.position).await,
        }
    }
}

#[derive(Debug, Default)]
pub struct DragStore {
    boards: HashMap<BoardId, Vec<Task>>,
    active: Option<Task>,
    /// Sequence number of the newest unsettled move per task.
    in_flight: HashMap<TaskId, u64>,
    next_seq: u64,
    config: BoardConfig,
}

impl DragStore {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Replace `board_id`'s list with `tasks`, stably sorted by position.
    pub fn load_board(&mut self, board_id: BoardId, mut tasks: Vec<Task>) {
        tasks.sort_by_key(|t| t.position);
        self.boards.insert(board_id, tasks);
    }

    /// Forget every board. Used before a full project reload.
    ///
    /// Moves still in flight settle as `Superseded` afterwards.
    pub fn clear(&mut self) {
        self.boards.clear();
        self.active = None;
        self.in_flight.clear();
    }

    pub fn board_ids(&self) -> impl Iterator<Item = BoardId> + '_ {
        self.boards.keys().copied()
    }

    pub fn is_loaded(&self, board_id: BoardId) -> bool {
        self.boards.contains_key(&board_id)
    }

    /// Tasks on `board_id` in display order; empty if not loaded.
    pub fn board_tasks(&self, board_id: BoardId) -> &[Task] {
        self.boards.get(&board_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_task(&self, task_id: TaskId) -> Option<&Task> {
        self.boards
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|t| t.id == task_id)
    }

    /// The board whose list currently holds `task_id`.
    pub fn board_of(&self, task_id: TaskId) -> Option<BoardId> {
        self.boards
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|t| t.id == task_id))
            .map(|(board_id, _)| *board_id)
    }

    /// Record `task_id` as the drag overlay payload.
    ///
    /// Unknown tasks (e.g. their board is still loading) leave the slot empty.
    pub fn begin_drag(&mut self, task_id: TaskId) -> Option<&Task> {
        self.active = self.find_task(task_id).cloned();
        self.active.as_ref()
    }

    pub fn cancel_drag(&mut self) {
        self.active = None;
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active.as_ref()
    }

    /// True while the newest move of `task_id` is neither settled nor abandoned.
    pub fn has_pending(&self, task_id: TaskId) -> bool {
        self.in_flight.contains_key(&task_id)
    }

    fn issue_seq(&mut self, task_id: TaskId) -> u64 {
        self.next_seq += 1;
        self.in_flight.insert(task_id, self.next_seq);
        self.next_seq
    }

    /// Optimistically move `task_id` to the front of `target`.
    pub fn apply_move(&mut self, task_id: TaskId, target: BoardId) -> Result<PendingMove, DragSkip> {
        let source = self.board_of(task_id).ok_or(DragSkip::TaskNotFound(task_id))?;
        if source == target {
            return Err(DragSkip::SameBoard(task_id));
        }

        let source_tasks = self
            .boards
            .get_mut(&source)
            .ok_or(DragSkip::TaskNotFound(task_id))?;
        let index = source_tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(DragSkip::TaskNotFound(task_id))?;
        let original = source_tasks.remove(index);

        let position = self.config.drop_position;
        self.boards
            .entry(target)
            .or_default()
            .insert(0, original.moved_to(target, position));

        let seq = self.issue_seq(task_id);
        tracing::debug!(%task_id, from = %source, to = %target, seq, "optimistic move applied");

        Ok(PendingMove {
            seq,
            original,
            kind: MoveKind::Across { from: source, to: target },
            position,
        })
    }

    /// Optimistically move `task_id` to `new_index` within its own board.
    ///
    /// `new_index` is clamped to the end of the list. Other tasks keep their
    /// positions; the moved task gets one that sorts into its new slot.
    pub fn apply_reorder(&mut self, task_id: TaskId, new_index: usize) -> Result<PendingMove, DragSkip> {
        let board = self.board_of(task_id).ok_or(DragSkip::TaskNotFound(task_id))?;
        let tasks = self
            .boards
            .get_mut(&board)
            .ok_or(DragSkip::TaskNotFound(task_id))?;
        let from_index = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(DragSkip::TaskNotFound(task_id))?;
        let to_index = new_index.min(tasks.len() - 1);
        if from_index == to_index {
            return Err(DragSkip::SamePosition(task_id));
        }

        let original = tasks.remove(from_index);
        let before = to_index.checked_sub(1).and_then(|i| tasks.get(i)).map(|t| t.position);
        let after = tasks.get(to_index).map(|t| t.position);
        let (position, exact) = slot_position(before, after);
        tasks.insert(to_index, original.moved_to(board, position));

        let seq = self.issue_seq(task_id);
        tracing::debug!(%task_id, %board, from_index, to_index, position, exact, seq, "optimistic reorder applied");

        Ok(PendingMove {
            seq,
            original,
            kind: MoveKind::Reorder {
                board,
                from_index,
                exact,
            },
            position,
        })
    }

    /// Reconcile a pending move with the server's answer.
    pub fn settle<N>(
        &mut self,
        pending: PendingMove,
        result: Result<Task, ServiceError>,
        notifier: &N,
    ) -> DragOutcome
    where
        N: Notifier + ?Sized,
    {
        let task_id = pending.task_id();
        let is_latest = self.in_flight.get(&task_id) == Some(&pending.seq);
        if is_latest {
            self.in_flight.remove(&task_id);
        }

        match result {
            Ok(_) if is_latest => DragOutcome::Moved,
            Ok(_) => DragOutcome::Superseded,
            Err(err) if !is_latest => {
                tracing::debug!(%task_id, seq = pending.seq, error = %err, "discarding stale move response");
                DragOutcome::Superseded
            }
            Err(err) => {
                tracing::warn!(%task_id, error = %err, "move rejected, rolling back");
                self.roll_back(pending);
                notifier.notify_failure(&self.config.move_failure_message);
                DragOutcome::RolledBack
            }
        }
    }

    /// Give up on a move that will never be dispatched.
    ///
    /// Local state is left as applied; the next reload corrects it.
    pub fn abandon(&mut self, pending: PendingMove) {
        let task_id = pending.task_id();
        if self.in_flight.get(&task_id) == Some(&pending.seq) {
            self.in_flight.remove(&task_id);
        }
    }

    fn roll_back(&mut self, pending: PendingMove) {
        let task_id = pending.task_id();
        match pending.kind {
            MoveKind::Across { from, to } => {
                if let Some(tasks) = self.boards.get_mut(&to) {
                    tasks.retain(|t| t.id != task_id);
                }
                // a reload may already have put the task back where the server has it
                if self.board_of(task_id).is_none() {
                    self.boards.entry(from).or_default().push(pending.original);
                }
            }
            MoveKind::Reorder { board, from_index, .. } => {
                if let Some(tasks) = self.boards.get_mut(&board)
                    && let Some(index) = tasks.iter().position(|t| t.id == task_id)
                {
                    tasks.remove(index);
                    let from_index = from_index.min(tasks.len());
                    tasks.insert(from_index, pending.original);
                }
            }
        }
    }

    /// Drag-end handler: clear the overlay, apply, send, settle.
    pub async fn complete_drag<S, N>(
        &mut self,
        task_id: TaskId,
        target: BoardId,
        service: &S,
        notifier: &N,
    ) -> DragOutcome
    where
        S: TaskService + ?Sized,
        N: Notifier + ?Sized,
    {
        self.active = None;
        let pending = match self.apply_move(task_id, target) {
            Ok(pending) => pending,
            Err(skip) => {
                tracing::debug!(%skip, "drop ignored");
                return DragOutcome::Skipped(skip);
            }
        };
        let result = pending.dispatch(service).await;
        self.settle(pending, result, notifier)
    }

    /// Same protocol as `complete_drag`, for a drop inside the task's own board.
    ///
    /// When the sent position could not sort strictly into the new slot, the
    /// board is re-fetched after the server accepts it so the list shows the
    /// server's order.
    pub async fn reorder_within_board<S, N>(
        &mut self,
        task_id: TaskId,
        new_index: usize,
        service: &S,
        notifier: &N,
    ) -> DragOutcome
    where
        S: TaskService + ?Sized,
        N: Notifier + ?Sized,
    {
        self.active = None;
        let pending = match self.apply_reorder(task_id, new_index) {
            Ok(pending) => pending,
            Err(skip) => return DragOutcome::Skipped(skip),
        };
        let board = pending.source();
        let resync = matches!(pending.kind, MoveKind::Reorder { exact: false, .. });
        let result = pending.dispatch(service).await;
        let outcome = self.settle(pending, result, notifier);
        if outcome == DragOutcome::Moved && resync {
            self.resync_board(board, service).await;
        }
        outcome
    }

    /// Replace `board_id`'s list with the server's, unless a move on it is unsettled.
    async fn resync_board<S>(&mut self, board_id: BoardId, service: &S)
    where
        S: TaskService + ?Sized,
    {
        if self.board_tasks(board_id).iter().any(|t| self.has_pending(t.id)) {
            tracing::debug!(%board_id, "resync skipped, moves still pending");
            return;
        }
        match service.fetch_board_tasks(board_id).await {
            Ok(tasks) => self.load_board(board_id, tasks),
            Err(err) => {
                tracing::warn!(%board_id, error = %err, "board resync failed, keeping local order");
            }
        }
    }
}
