//! Queued task types

use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::SyncError;

/// Re-invocable unit of work; called once per attempt
pub type SyncTask = Box<dyn Fn() -> BoxFuture<'static, Result<(), SyncError>> + Send + Sync>;

/// Identifier assigned to a task at enqueue time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a task attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    RetryScheduled,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::RetryScheduled => "retry_scheduled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final result of a task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    pub id: TaskId,
    /// Attempts made, including the first
    pub attempts: u32,
    /// `Err` holds the error of the last attempt
    pub result: Result<(), SyncError>,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn state(&self) -> TaskState {
        if self.is_success() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        }
    }
}

/// Handle returned by [`crate::SyncQueue::enqueue_tracked`]
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    receiver: oneshot::Receiver<TaskOutcome>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, receiver: oneshot::Receiver<TaskOutcome>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wait for the task to finish
    ///
    /// Returns `None` only if the runtime shut down before the task ran.
    pub async fn outcome(self) -> Option<TaskOutcome> {
        self.receiver.await.ok()
    }
}

/// Task waiting in the FIFO
pub(crate) struct QueuedTask {
    pub id: TaskId,
    pub run: SyncTask,
    pub completion: Option<oneshot::Sender<TaskOutcome>>,
}
