//! Scheduled tile loads and their lifecycle

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::error::Error;
use crate::tiles::TileKey;

/// Outcome of one unit of work
pub type TaskResult = std::result::Result<(), Error>;

/// In-flight work of a started task
pub type TaskFuture = Pin<Box<dyn Future<Output = TaskResult> + Send + 'static>>;

/// Deferred work, invoked once with the task's cancellation handle
pub type TaskWork = Box<dyn FnOnce(TaskHandle) -> TaskFuture + Send + 'static>;

/// Lifecycle of a task.
///
/// `Pending -> Running -> Done | Error`; pending tasks missing from a scan
/// become `Disabled` and return to `Pending` when seen again. `Cancelled`
/// is final and never restarted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Running,
    Disabled,
    Cancelled,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Cancelled | TaskStatus::Done | TaskStatus::Error)
    }
}

/// Cooperative cancellation flag shared with the running work
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A tile load owned by the queue
pub struct Task {
    pub key: TileKey,
    /// Distinguishes this task from a later one created under the same key
    pub serial: u64,
    /// Higher = more important
    pub priority: f32,
    status: TaskStatus,
    handle: TaskHandle,
    work: Option<TaskWork>,
}

impl Task {
    pub fn new(key: TileKey, serial: u64, priority: f32, work: TaskWork) -> Self {
        Self {
            key,
            serial,
            priority,
            status: TaskStatus::Pending,
            handle: TaskHandle::new(),
            work: Some(work),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == TaskStatus::Cancelled
    }

    pub(crate) fn disable(&mut self) {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Disabled;
        }
    }

    pub(crate) fn enable(&mut self) {
        if self.status == TaskStatus::Disabled {
            self.status = TaskStatus::Pending;
        }
    }

    /// Begin the work. Returns `None` unless the task is pending.
    pub(crate) fn start(&mut self) -> Option<TaskFuture> {
        if self.status != TaskStatus::Pending {
            return None;
        }
        let work = self.work.take()?;
        self.status = TaskStatus::Running;
        Some(work(self.handle.clone()))
    }

    pub(crate) fn cancel(&mut self) {
        self.status = TaskStatus::Cancelled;
        self.work = None;
        self.handle.cancel();
    }

    pub(crate) fn finish(&mut self, outcome: &TaskResult) {
        if self.status == TaskStatus::Running {
            self.status = match outcome {
                Ok(()) => TaskStatus::Done,
                Err(_) => TaskStatus::Error,
            };
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("key", &self.key)
            .field("serial", &self.serial)
            .field("priority", &self.priority)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let work: TaskWork = Box::new(|_handle| -> TaskFuture { Box::pin(async { Ok::<(), Error>(()) }) });
        Task::new(TileKey::new(0, 0, 0), 0, 1.0, work)
    }

    #[test]
    fn test_start_runs_once() {
        let mut task = task();
        assert!(task.start().is_some());
        assert_eq!(task.status(), TaskStatus::Running);
        assert!(task.start().is_none());
    }

    #[test]
    fn test_disabled_task_does_not_start() {
        let mut task = task();
        task.disable();
        assert!(task.start().is_none());
        task.enable();
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.start().is_some());
    }

    #[test]
    fn test_running_task_is_not_disabled() {
        let mut task = task();
        let _future = task.start();
        task.disable();
        assert_eq!(task.status(), TaskStatus::Running);
    }

    #[test]
    fn test_cancel_flags_handle() {
        let mut task = task();
        let handle = task.handle().clone();
        task.cancel();
        assert!(handle.is_cancelled());
        assert!(task.start().is_none());
        assert!(task.status().is_terminal());
    }

    #[test]
    fn test_finish_records_outcome() {
        let mut task = task();
        let _future = task.start();
        task.finish(&Err(Error::Task("boom".into())));
        assert_eq!(task.status(), TaskStatus::Error);
    }
}
