//! sync-queue - Serialized retry queue for SiteWorks sync
//!
//! Entity changes (create, update, delete) are pushed to a remote one at a
//! time, in the order they were enqueued. Each push is retried with
//! exponential backoff; after the retry budget is spent the push is logged
//! and dropped so later pushes are never blocked.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sync_queue::{enqueue_sync, EntityKind, SimulatedRemote, SyncQueue, SyncRequest};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .start_paused(true)
//! #     .build()
//! #     .unwrap();
//! # rt.block_on(async {
//! let queue = SyncQueue::default();
//! let remote = Arc::new(SimulatedRemote::default());
//!
//! let project = uuid::Uuid::new_v4();
//! enqueue_sync(&queue, remote.clone(), SyncRequest::create(EntityKind::Project, project));
//! enqueue_sync(&queue, remote.clone(), SyncRequest::update(EntityKind::Project, project));
//!
//! queue.wait_idle().await;
//! assert_eq!(remote.delivered().len(), 2);
//! # });
//! ```
//!
//! # Retry schedule (defaults)
//!
//! | Attempt | Wait before it |
//! |---------|----------------|
//! | 1 | - |
//! | 2 | 1 s |
//! | 3 | 2 s |
//! | 4 | 4 s |

pub mod error;
pub mod policy;
pub mod queue;
pub mod remote;
pub mod task;

// Re-exports for convenience
pub use error::{Result, SyncError};
pub use policy::{RetryPolicy, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_RETRIES};
pub use queue::{QueueStats, SyncQueue};
pub use remote::{
    enqueue_sync, enqueue_sync_tracked, EntityKind, RemoteEndpoint, SimulatedRemote,
    SyncOperation, SyncRequest,
};
pub use task::{SyncTask, TaskHandle, TaskId, TaskOutcome, TaskState};
