//! Ownership of an adapter's background tasks.

use std::future::Future;

use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinSet};

/// Set of tasks that live no longer than their owner.
///
/// Dropping the scope aborts everything still running in it.
#[derive(Default)]
pub struct TaskScope {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` on the current runtime, owned by this scope.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&self, task: F) -> AbortHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        Self::reap(&mut tasks);
        tasks.spawn(task)
    }

    /// Abort every task in the scope. The scope stays usable.
    pub fn shutdown(&self) {
        self.tasks.lock().abort_all();
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn active(&self) -> usize {
        let mut tasks = self.tasks.lock();
        Self::reap(&mut tasks);
        tasks.len()
    }

    fn reap(tasks: &mut JoinSet<()>) {
        while tasks.try_join_next().is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn finished_tasks_are_reaped() {
        let scope = TaskScope::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        scope.spawn(async move {
            let _ = tx.send(());
        });
        rx.await.unwrap();
        tokio::task::yield_now().await;

        let mut remaining = scope.active();
        for _ in 0..10 {
            if remaining == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            remaining = scope.active();
        }
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn shutdown_aborts_running_tasks() {
        let scope = TaskScope::new();
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let handle = scope.spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });

        scope.shutdown();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handle.is_finished());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropping_scope_aborts_tasks() {
        let scope = TaskScope::new();
        let handle = scope.spawn(std::future::pending());

        drop(scope);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(handle.is_finished());
    }
}
