//! Error types for sync-queue

use errors::{ErrorCategory, SiteErrorTrait};
use thiserror::Error;

/// Failure of a single sync attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Network error")]
    Network,

    #[error("Server error")]
    Server,

    #[error("Unknown sync error: {0}")]
    Unknown(String),
}

impl SyncError {
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::Unknown(msg.into())
    }
}

impl SiteErrorTrait for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Network => "SYNC_NETWORK",
            Self::Server => "SYNC_SERVER",
            Self::Unknown(_) => "SYNC_UNKNOWN",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Network | Self::Server => ErrorCategory::Network,
            Self::Unknown(_) => ErrorCategory::Unknown,
        }
    }

    // Every task failure is retried until the budget runs out.
    fn is_retryable(&self) -> bool {
        true
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
