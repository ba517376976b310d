use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BoardId, CommentId, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One card on a Kanban board.
///
/// `board_id` and `position` are the only fields the board view mutates
/// locally; everything else is owned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub board_id: BoardId,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub estimated_hours: Option<f64>,

    /// Rank within the board, ascending = display order.
    pub position: i32,

    #[serde(default)]
    pub assignee_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<TaskComment>,
}

impl Task {
    pub fn new(id: TaskId, board_id: BoardId, title: impl Into<String>, position: i32) -> Self {
        Self {
            id,
            board_id,
            title: title.into(),
            description: None,
            priority: Priority::default(),
            due_date: None,
            estimated_hours: None,
            position,
            assignee_id: None,
            comments: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }

    /// Copy of this task placed on `board_id` at `position`.
    pub fn moved_to(&self, board_id: BoardId, position: i32) -> Self {
        Self {
            board_id,
            position,
            ..self.clone()
        }
    }

    /// `due_date` が `today` より前かどうか
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date.is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ulid::Ulid;

    #[test]
    fn decodes_api_payload_with_optional_fields_missing() {
        let task_id = Ulid::new();
        let board_id = Ulid::new();
        let payload = json!({
            "id": task_id.to_string(),
            "board_id": board_id.to_string(),
            "title": "Wire the sensor rack",
            "priority": "urgent",
            "position": 3,
        });

        let task: Task = serde_json::from_value(payload).unwrap();
        assert_eq!(task.id.as_ulid(), task_id);
        assert_eq!(task.board_id.as_ulid(), board_id);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.position, 3);
        assert!(task.due_date.is_none());
        assert!(task.comments.is_empty());
    }

    #[test]
    fn moved_to_only_touches_board_and_position() {
        let original = Task::new(
            TaskId::from_ulid(Ulid::new()),
            BoardId::from_ulid(Ulid::new()),
            "Order cables",
            7,
        )
        .with_priority(Priority::High)
        .with_estimate(2.5);
        let target = BoardId::from_ulid(Ulid::new());

        let moved = original.moved_to(target, 0);

        assert_eq!(moved.board_id, target);
        assert_eq!(moved.position, 0);
        assert_eq!(moved.id, original.id);
        assert_eq!(moved.priority, Priority::High);
        assert_eq!(moved.estimated_hours, Some(2.5));
    }

    #[test]
    fn overdue_only_with_past_due_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let task = Task::new(
            TaskId::from_ulid(Ulid::new()),
            BoardId::from_ulid(Ulid::new()),
            "Audit stock",
            0,
        );

        assert!(!task.is_overdue(today));
        let due_yesterday = task.clone().with_due_date(today.pred_opt().unwrap());
        assert!(due_yesterday.is_overdue(today));
        let due_today = task.with_due_date(today);
        assert!(!due_today.is_overdue(today));
    }
}
