//! IdGenerator port - ID 生成の抽象化
//!
//! 本物の ID は API が採番します。ここで生成するのは、
//! インメモリのタスクサービスや CLI デモがデータを作るときだけです。

use crate::domain::ids::{BoardId, CommentId, Id, IdMarker, ProjectId, TaskId, UserId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は型付き ID を生成
pub trait IdGenerator: Send + Sync {
    fn generate<T: IdMarker>(&self) -> Id<T>;

    fn project_id(&self) -> ProjectId {
        self.generate()
    }

    fn board_id(&self) -> BoardId {
        self.generate()
    }

    fn task_id(&self) -> TaskId {
        self.generate()
    }

    fn user_id(&self) -> UserId {
        self.generate()
    }

    fn comment_id(&self) -> CommentId {
        self.generate()
    }
}

/// UlidGenerator は Clock の時刻をタイムスタンプ部に使う ULID 生成器
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate<T: IdMarker>(&self) -> Id<T> {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Id::from_ulid(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
