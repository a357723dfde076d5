//! Remote sync endpoint and entity change requests
//!
//! Mutation sites describe what changed as a [`SyncRequest`] and hand it to
//! [`enqueue_sync`]; the queue never looks inside the request.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, SyncError};
use crate::queue::SyncQueue;
use crate::task::{TaskHandle, TaskId};

/// Kind of record being synced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    SiteDiaryEntry,
    CostReport,
    Drawing,
    Inspection,
    Invoice,
    Material,
    StaffMember,
    HandoverItem,
    CableCalculation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::SiteDiaryEntry => "site_diary_entry",
            Self::CostReport => "cost_report",
            Self::Drawing => "drawing",
            Self::Inspection => "inspection",
            Self::Invoice => "invoice",
            Self::Material => "material",
            Self::StaffMember => "staff_member",
            Self::HandoverItem => "handover_item",
            Self::CableCalculation => "cable_calculation",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutation being pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entity change to push to the remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub entity: EntityKind,
    pub operation: SyncOperation,
    pub entity_id: Uuid,
    /// Human-readable name, e.g. a project title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SyncRequest {
    pub fn new(entity: EntityKind, operation: SyncOperation, entity_id: Uuid) -> Self {
        Self {
            entity,
            operation,
            entity_id,
            label: None,
        }
    }

    pub fn create(entity: EntityKind, entity_id: Uuid) -> Self {
        Self::new(entity, SyncOperation::Create, entity_id)
    }

    pub fn update(entity: EntityKind, entity_id: Uuid) -> Self {
        Self::new(entity, SyncOperation::Update, entity_id)
    }

    pub fn delete(entity: EntityKind, entity_id: Uuid) -> Self {
        Self::new(entity, SyncOperation::Delete, entity_id)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl std::fmt::Display for SyncRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} for {} {}", self.operation, self.entity, self.entity_id)?;
        if let Some(label) = &self.label {
            write!(f, ": {}", label)?;
        }
        Ok(())
    }
}

/// Destination of sync pushes
pub trait RemoteEndpoint: Send + Sync + 'static {
    /// Push one change; an error makes the queue retry
    fn push(&self, request: &SyncRequest) -> impl Future<Output = Result<()>> + Send;
}

/// Stand-in remote that sleeps and optionally fails at random
#[derive(Debug)]
pub struct SimulatedRemote {
    latency: Duration,
    failure_rate: f64,
    delivered: Mutex<Vec<SyncRequest>>,
}

impl Default for SimulatedRemote {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), 0.0)
    }
}

impl SimulatedRemote {
    /// `failure_rate` is clamped to `[0, 1]`
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            latency,
            failure_rate,
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Requests accepted so far, in delivery order
    pub fn delivered(&self) -> Vec<SyncRequest> {
        self.delivered.lock().clone()
    }
}

impl RemoteEndpoint for SimulatedRemote {
    async fn push(&self, request: &SyncRequest) -> Result<()> {
        info!("Syncing {}", request);
        tokio::time::sleep(self.latency).await;

        let failed = rand::thread_rng().gen_bool(self.failure_rate);
        if failed {
            return Err(SyncError::Network);
        }

        self.delivered.lock().push(request.clone());
        Ok(())
    }
}

fn push_task<R: RemoteEndpoint>(
    remote: Arc<R>,
    request: SyncRequest,
) -> impl Fn() -> BoxFuture<'static, Result<()>> + Send + Sync + 'static {
    move || {
        let remote = Arc::clone(&remote);
        let request = request.clone();
        async move { remote.push(&request).await }.boxed()
    }
}

/// Queue a push of `request` to `remote`
pub fn enqueue_sync<R: RemoteEndpoint>(
    queue: &SyncQueue,
    remote: Arc<R>,
    request: SyncRequest,
) -> TaskId {
    queue.enqueue(push_task(remote, request))
}

/// Queue a push and keep a handle to its outcome
pub fn enqueue_sync_tracked<R: RemoteEndpoint>(
    queue: &SyncQueue,
    remote: Arc<R>,
    request: SyncRequest,
) -> TaskHandle {
    queue.enqueue_tracked(push_task(remote, request))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_request_display() {
        let id = Uuid::nil();
        let request = SyncRequest::update(EntityKind::Project, id).with_label("Office Renovation");
        assert_eq!(
            request.to_string(),
            format!("update for project {}: Office Renovation", id)
        );
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        assert_eq!(SimulatedRemote::new(Duration::ZERO, 2.0).failure_rate(), 1.0);
        assert_eq!(SimulatedRemote::new(Duration::ZERO, -1.0).failure_rate(), 0.0);
        assert_eq!(SimulatedRemote::new(Duration::ZERO, f64::NAN).failure_rate(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_remote_delivers() {
        let remote = Arc::new(SimulatedRemote::default());
        let queue = SyncQueue::default();
        let id = Uuid::new_v4();

        let handle = enqueue_sync_tracked(
            &queue,
            Arc::clone(&remote),
            SyncRequest::create(EntityKind::Project, id),
        );
        assert!(handle.outcome().await.unwrap().is_success());
        assert_eq!(remote.delivered()[0].entity_id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_remote_is_dropped() {
        let remote = Arc::new(SimulatedRemote::new(Duration::from_millis(10), 1.0));
        let queue = SyncQueue::default();

        let handle = enqueue_sync_tracked(
            &queue,
            Arc::clone(&remote),
            SyncRequest::delete(EntityKind::Invoice, Uuid::new_v4()),
        );
        let outcome = handle.outcome().await.unwrap();
        assert_eq!(outcome.attempts, 4);
        assert_eq!(outcome.result, Err(SyncError::Network));
        assert!(remote.delivered().is_empty());
    }
}
