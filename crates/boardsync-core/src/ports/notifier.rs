//! Notifier port - ユーザーに見える失敗通知
//!
//! 現状の通知は「タスク移動の失敗」の 1 種類だけ。

use std::sync::Arc;

pub trait Notifier: Send + Sync {
    fn notify_failure(&self, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify_failure(&self, message: &str) {
        (**self).notify_failure(message)
    }
}
