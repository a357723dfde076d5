//! `sync-demo` command: push simulated project changes through the queue

use anyhow::Result;
use clap::Args;
use colored::*;
use common::validation::ensure_fraction;
use common::{run_until_shutdown, SyncConfig};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use sync_queue::{
    enqueue_sync_tracked, EntityKind, QueueStats, RemoteEndpoint, SimulatedRemote, SyncQueue,
    SyncRequest, TaskOutcome,
};
use tracing::info;
use uuid::Uuid;

/// Conventional exit code after Ctrl+C
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Args, Debug, Clone)]
pub struct SyncDemoArgs {
    /// Number of projects to create
    #[arg(long, default_value_t = 3)]
    pub count: usize,

    /// Probability that a simulated push fails; defaults to the configured rate
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Simulated push latency in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,
}

/// Result of one demo run
#[derive(Debug)]
pub struct DemoReport {
    pub outcomes: Vec<(SyncRequest, Option<TaskOutcome>)>,
    pub stats: QueueStats,
}

/// Changes a user would make while setting up `count` projects
///
/// Every project is created then renamed; every third one is deleted again.
pub fn demo_requests(count: usize) -> Vec<SyncRequest> {
    let mut requests = Vec::new();
    for n in 1..=count {
        let id = Uuid::new_v4();
        requests.push(
            SyncRequest::create(EntityKind::Project, id).with_label(format!("Site Project {}", n)),
        );
        requests.push(
            SyncRequest::update(EntityKind::Project, id)
                .with_label(format!("Site Project {} (revised)", n)),
        );
        if n % 3 == 0 {
            requests.push(SyncRequest::delete(EntityKind::Project, id));
        }
    }
    requests
}

/// Enqueue every request and wait for the queue to drain
pub async fn run_demo<R: RemoteEndpoint>(
    queue: &SyncQueue,
    remote: Arc<R>,
    requests: Vec<SyncRequest>,
) -> DemoReport {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let handle = enqueue_sync_tracked(queue, Arc::clone(&remote), request.clone());
            (request, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (request, handle) in handles {
        outcomes.push((request, handle.outcome().await));
    }
    queue.wait_idle().await;

    DemoReport {
        outcomes,
        stats: queue.stats(),
    }
}

pub async fn run_sync_demo(args: &SyncDemoArgs, settings: &SyncConfig) -> Result<ExitCode> {
    let failure_rate = args.failure_rate.unwrap_or(settings.failure_rate);
    ensure_fraction("failure-rate", failure_rate)?;
    let latency = args
        .latency_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.simulated_latency());

    let queue = SyncQueue::new(settings.retry_policy());
    let remote = Arc::new(SimulatedRemote::new(latency, failure_rate));
    let requests = demo_requests(args.count);

    info!(
        requests = requests.len(),
        failure_rate,
        max_retries = queue.policy().max_retries,
        "Starting sync demo"
    );

    let Some(report) = run_until_shutdown(run_demo(&queue, remote, requests)).await else {
        eprintln!(
            "{} {} pending task(s) abandoned",
            "Interrupted:".yellow(),
            queue.pending()
        );
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    };

    println!("{}", "Sync Results".bright_cyan());
    println!("{}", "=".repeat(60).bright_blue());
    for (request, outcome) in &report.outcomes {
        match outcome {
            Some(outcome) if outcome.is_success() => println!(
                "{} {} ({} attempt(s))",
                "OK".green(),
                request,
                outcome.attempts
            ),
            Some(outcome) => println!(
                "{} {} ({} attempt(s), dropped)",
                "FAIL".red(),
                request,
                outcome.attempts
            ),
            None => println!("{} {}", "LOST".red(), request),
        }
    }
    println!("{}", "=".repeat(60).bright_blue());
    println!(
        "enqueued: {}  succeeded: {}  failed: {}  retries: {}",
        report.stats.enqueued, report.stats.succeeded, report.stats.failed, report.stats.retries
    );

    Ok(ExitCode::SUCCESS)
}
