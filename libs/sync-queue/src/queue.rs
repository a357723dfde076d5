//! Serialized retry queue
//!
//! Tasks run one at a time in enqueue order. A single drain task owns
//! execution; it is spawned by the first `enqueue` on an empty queue and
//! exits once the FIFO is empty.

use futures::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::error::SyncError;
use crate::policy::RetryPolicy;
use crate::task::{QueuedTask, SyncTask, TaskHandle, TaskId, TaskOutcome, TaskState};

/// Snapshot of queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub enqueued: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Retry attempts across all tasks
    pub retries: u64,
    /// Tasks waiting in the FIFO (excludes the running one)
    pub pending: usize,
}

#[derive(Default)]
struct Counters {
    enqueued: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
}

struct QueueState {
    tasks: VecDeque<QueuedTask>,
    draining: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    policy: RetryPolicy,
    idle_tx: watch::Sender<bool>,
    counters: Counters,
}

/// FIFO sync queue with bounded exponential-backoff retry
///
/// Cloning is cheap and every clone feeds the same FIFO.
#[derive(Clone)]
pub struct SyncQueue {
    inner: Arc<Inner>,
}

impl Default for SyncQueue {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl std::fmt::Debug for SyncQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncQueue")
            .field("policy", &self.inner.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

impl SyncQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        let (idle_tx, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    tasks: VecDeque::new(),
                    draining: false,
                }),
                policy,
                idle_tx,
                counters: Counters::default(),
            }),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.inner.policy
    }

    /// Append a task and start draining if no drain is running
    ///
    /// Fire-and-forget: the outcome is only logged. Must be called from
    /// within a tokio runtime.
    pub fn enqueue<F, Fut>(&self, task: F) -> TaskId
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
    {
        self.push(Box::new(move || task().boxed()), None)
    }

    /// Like [`enqueue`](Self::enqueue), also returning a handle to the outcome
    pub fn enqueue_tracked<F, Fut>(&self, task: F) -> TaskHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let id = self.push(Box::new(move || task().boxed()), Some(tx));
        TaskHandle::new(id, rx)
    }

    fn push(&self, run: SyncTask, completion: Option<oneshot::Sender<TaskOutcome>>) -> TaskId {
        let id = TaskId::new();

        let start_drain = {
            let mut state = self.inner.state.lock();
            state.tasks.push_back(QueuedTask {
                id,
                run,
                completion,
            });
            self.inner.counters.enqueued.fetch_add(1, Ordering::Relaxed);

            if state.draining {
                false
            } else {
                state.draining = true;
                self.inner.idle_tx.send_replace(false);
                true
            }
        };

        debug!(task_id = %id, state = %TaskState::Pending, "Task enqueued");

        if start_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(inner.drain());
        }
        id
    }

    /// Number of tasks waiting behind the running one
    pub fn pending(&self) -> usize {
        self.inner.state.lock().tasks.len()
    }

    /// True when nothing is queued and no drain is running
    pub fn is_idle(&self) -> bool {
        !self.inner.state.lock().draining
    }

    /// Wait until the FIFO is empty and the drain has stopped
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.idle_tx.subscribe();
        let _ = rx.wait_for(|idle| *idle).await;
    }

    pub fn stats(&self) -> QueueStats {
        let counters = &self.inner.counters;
        QueueStats {
            enqueued: counters.enqueued.load(Ordering::Relaxed),
            succeeded: counters.succeeded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            retries: counters.retries.load(Ordering::Relaxed),
            pending: self.pending(),
        }
    }
}

/// Releases the drain flag if the drain task stops without emptying the FIFO
struct DrainGuard {
    inner: Arc<Inner>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let mut state = self.inner.state.lock();
        if !state.tasks.is_empty() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                error!(
                    pending = state.tasks.len(),
                    "Sync queue drain stopped unexpectedly, restarting"
                );
                handle.spawn(Arc::clone(&self.inner).drain());
                return;
            }
        }

        error!(pending = state.tasks.len(), "Sync queue drain stopped unexpectedly");
        state.draining = false;
        self.inner.idle_tx.send_replace(true);
    }
}

impl Inner {
    async fn drain(self: Arc<Self>) {
        let mut guard = DrainGuard {
            inner: Arc::clone(&self),
            finished: false,
        };

        loop {
            let next = {
                let mut state = self.state.lock();
                match state.tasks.pop_front() {
                    Some(task) => task,
                    None => {
                        state.draining = false;
                        self.idle_tx.send_replace(true);
                        guard.finished = true;
                        debug!("Sync queue drained");
                        return;
                    },
                }
            };
            self.process(next).await;
        }
    }

    async fn process(&self, task: QueuedTask) {
        let QueuedTask {
            id,
            run,
            completion,
        } = task;

        let outcome = self.execute_with_retry(id, &run).await;
        match &outcome.result {
            Ok(()) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                info!(task_id = %id, attempts = outcome.attempts, "Task synced successfully");
            },
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    task_id = %id,
                    attempts = outcome.attempts,
                    retries = self.policy.max_retries,
                    waited_ms = self.policy.total_backoff().as_millis() as u64,
                    error = %e,
                    "Task failed after retries, dropping"
                );
            },
        }

        if let Some(tx) = completion {
            // Receiver may have been dropped; the outcome is already logged
            let _ = tx.send(outcome);
        }
    }

    async fn execute_with_retry(&self, id: TaskId, run: &SyncTask) -> TaskOutcome {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(task_id = %id, attempt, state = %TaskState::Running, "Running task");

            // run() is called inside the unwind boundary so a panic while
            // building the future is caught as well as one while polling it
            let result = match AssertUnwindSafe(async { run().await }).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(SyncError::unknown("task panicked")),
            };

            let error = match result {
                Ok(()) => {
                    return TaskOutcome {
                        id,
                        attempts: attempt,
                        result: Ok(()),
                    }
                },
                Err(e) => e,
            };

            if !self.policy.should_retry(attempt) {
                return TaskOutcome {
                    id,
                    attempts: attempt,
                    result: Err(error),
                };
            }

            let backoff = self.policy.backoff_for(attempt);
            self.counters.retries.fetch_add(1, Ordering::Relaxed);
            warn!(
                task_id = %id,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                state = %TaskState::RetryScheduled,
                error = %error,
                "Retry attempt {} for task, backing off",
                attempt
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[tokio::test(start_paused = true)]
    async fn test_success_first_attempt() {
        let queue = SyncQueue::default();
        let handle = queue.enqueue_tracked(|| async { Ok(()) });

        let outcome = handle.outcome().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.state(), TaskState::Succeeded);

        queue.wait_idle().await;
        let stats = queue.stats();
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.retries, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let queue = SyncQueue::default();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let handle = queue.enqueue_tracked(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(SyncError::Network)
                } else {
                    Ok(())
                }
            }
        });

        let outcome = handle.outcome().await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(queue.stats().retries, 2);
    }

    async fn explode() -> Result<(), SyncError> {
        panic!("boom")
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_counts_as_failure() {
        let queue = SyncQueue::new(RetryPolicy::new(1, Duration::from_millis(5)));
        let handle = queue.enqueue_tracked(explode);

        let outcome = handle.outcome().await.unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.result, Err(SyncError::unknown("task panicked")));

        queue.wait_idle().await;
        assert!(queue.is_idle());
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_final_failure_is_logged() {
        let queue = SyncQueue::new(RetryPolicy::new(2, Duration::from_millis(50)));
        let id = queue.enqueue(|| async { Err(SyncError::Server) });
        queue.wait_idle().await;

        assert!(logs_contain("Retry attempt 1 for task"));
        assert!(logs_contain("Retry attempt 2 for task"));
        assert!(!logs_contain("Retry attempt 3 for task"));
        assert!(logs_contain("Task failed after retries, dropping"));
        assert!(logs_contain("waited_ms=150"));
        assert!(logs_contain(&id.to_string()));
    }

    #[tokio::test]
    async fn test_wait_idle_on_empty_queue_returns() {
        let queue = SyncQueue::default();
        queue.wait_idle().await;
        assert!(queue.is_idle());
        assert_eq!(queue.stats(), QueueStats::default());
    }

    #[test]
    fn test_abandoned_drain_releases_queue() {
        let queue = SyncQueue::default();
        {
            let mut state = queue.inner.state.lock();
            state.tasks.push_back(QueuedTask {
                id: TaskId::new(),
                run: Box::new(|| async { Ok::<(), SyncError>(()) }.boxed()),
                completion: None,
            });
            state.draining = true;
        }
        queue.inner.idle_tx.send_replace(false);

        // No runtime to restart on, so the guard only releases the flag
        drop(DrainGuard {
            inner: Arc::clone(&queue.inner),
            finished: false,
        });

        assert!(queue.is_idle());
        assert!(*queue.inner.idle_tx.borrow());
        assert_eq!(queue.pending(), 1);
    }
}
