//! Ctrl+C / SIGTERM handling for long-running commands

use std::future::Future;

use tracing::{info, warn};

/// Resolve when Ctrl+C (or SIGTERM on Unix) arrives
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let term_signal = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                None
            },
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                match term_signal {
                    Some(mut sig) => { sig.recv().await; },
                    None => std::future::pending::<()>().await,
                }
            } => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Drive `work` to completion unless a shutdown signal comes first
///
/// Returns `None` when interrupted.
pub async fn run_until_shutdown<F: Future>(work: F) -> Option<F::Output> {
    run_until(work, wait_for_shutdown()).await
}

async fn run_until<F: Future, S: Future<Output = ()>>(work: F, stop: S) -> Option<F::Output> {
    tokio::select! {
        output = work => Some(output),
        _ = stop => {
            info!("Shutdown signal received, stopping");
            None
        },
    }
}
