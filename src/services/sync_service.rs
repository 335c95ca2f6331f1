//! Domain service for pulling external sources into the event store.

use thiserror::Error;

use crate::models::{EventSource, SyncReport};

/// Errors from a whole-source sync run. Per-container failures are not
/// errors; they are absorbed into the [`SyncReport`] counts.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The bearer token was rejected outright. No writes were performed.
    #[error("{source} rejected the bearer token")]
    UpstreamAuth { r#source: EventSource },

    /// The source could not be reached or answered garbage at the top level.
    /// Retryable by the caller; no writes were performed.
    #[error("{source} is unavailable: {message}")]
    Upstream {
        r#source: EventSource,
        message: String,
    },

    #[error("Manual events cannot be linked to an external source")]
    NotLinkable,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Domain service trait for source synchronization.
///
/// Sources are independent: a run for one source never touches another
/// source's rows, so runs for different sources may proceed concurrently.
#[async_trait::async_trait]
pub trait SyncService: Send + Sync {
    /// Fetch the source's items with the supplied bearer credential,
    /// normalize them, and upsert them into the user's event store. On any
    /// successful run the credential is persisted for the (user, source)
    /// pair, replacing a prior one.
    async fn link_source(
        &self,
        user_id: i32,
        source: EventSource,
        bearer_token: &str,
    ) -> Result<SyncReport, SyncError>;
}
