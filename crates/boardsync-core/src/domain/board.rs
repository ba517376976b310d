use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{BoardId, ProjectId, UserId};

/// A Kanban column. Tasks are fetched per board, not embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub project_id: ProjectId,
    pub name: String,
    pub position: i32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Archived,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: UserId,
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub start_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    pub status: ProjectStatus,

    #[serde(default)]
    pub members: Vec<ProjectMember>,

    #[serde(default)]
    pub boards: Vec<Board>,
}

impl Project {
    /// Boards in column order (ascending `position`, stable on ties).
    pub fn boards_in_order(&self) -> Vec<&Board> {
        let mut boards: Vec<&Board> = self.boards.iter().collect();
        boards.sort_by_key(|b| b.position);
        boards
    }
}
