//! Domain model (ids, tasks, boards, projects, roles, errors).

pub mod board;
pub mod errors;
pub mod ids;
pub mod role;
pub mod task;

pub use board::{Board, MemberRole, Project, ProjectMember, ProjectStatus};
pub use errors::{ErrorKind, ServiceError, StorageError};
pub use ids::{BoardId, CommentId, ProjectId, TaskId, UserId};
pub use role::{Capability, Role};
pub use task::{Priority, Task, TaskComment};
