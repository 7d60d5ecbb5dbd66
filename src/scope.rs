use parking_lot::Mutex as PMutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task;

/// The tasks of one screen. Closing the scope aborts every task in it, and
/// nothing can be launched into it afterwards.
///
/// Clones share the same set, so tasks can launch more tasks into their own
/// scope.
#[derive(Clone)]
pub(crate) struct ScreenScope {
    tasks: Arc<PMutex<Option<task::JoinSet<()>>>>,
}

impl ScreenScope {
    pub fn new() -> ScreenScope {
        ScreenScope {
            tasks: Arc::new(PMutex::new(Some(task::JoinSet::new()))),
        }
    }

    /// Spawn `future` in this scope. Returns false if the scope is closed.
    pub fn launch<F>(&self, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        let tasks = match tasks.as_mut() {
            Some(tasks) => tasks,
            None => return false,
        };

        // Reap finished tasks
        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!("Screen task panicked: {}", e);
                }
            }
        }

        tasks.spawn(future);
        true
    }

    pub fn close(&self) {
        let tasks = self.tasks.lock().take();
        if let Some(mut tasks) = tasks {
            tasks.abort_all();
        }
    }
}
