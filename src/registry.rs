//! Local document registry kept in sync with the backend by polling.
//!
//! The registry owns the cached listing and a single optional notice. A
//! refresh never fails at the API boundary: every outcome — fresh data, an
//! empty listing, or a failure — becomes registry state. Failures discard
//! the previous listing; the registry never shows stale data next to an
//! error.
//!
//! [`run_poller`] drives periodic refreshes for a live view. One task owns
//! the registry for the poller's lifetime, so refreshes are serialized and
//! a slow backend can never cause overlapping refresh calls; missed ticks
//! are skipped rather than bursted.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::models::Document;

/// A user-facing notice attached to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryNotice {
    /// Empty-but-successful listing; rendered as guidance, not an alarm.
    Guidance(String),
    /// Transport or server failure while refreshing.
    Failure(String),
}

impl RegistryNotice {
    pub fn text(&self) -> &str {
        match self {
            RegistryNotice::Guidance(s) | RegistryNotice::Failure(s) => s,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RegistryNotice::Failure(_))
    }
}

/// Locally cached view of the backend's document listing.
pub struct DocumentRegistry {
    client: Arc<BackendClient>,
    files: Vec<Document>,
    notice: Option<RegistryNotice>,
}

impl DocumentRegistry {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self {
            client,
            files: Vec::new(),
            notice: None,
        }
    }

    pub fn files(&self) -> &[Document] {
        &self.files
    }

    pub fn notice(&self) -> Option<&RegistryNotice> {
        self.notice.as_ref()
    }

    /// Synchronize the cached listing with the backend.
    ///
    /// - At least one document: listing replaced, notice cleared.
    /// - Zero documents: listing emptied, guidance notice set.
    /// - Failure: listing cleared, failure notice set.
    pub async fn refresh(&mut self) {
        match self.client.list_files().await {
            Ok(files) => {
                debug!(count = files.len(), "registry refreshed");
                self.files = files;
                self.notice = None;
            }
            Err(ApiError::EmptyResult(msg)) => {
                self.files.clear();
                self.notice = Some(RegistryNotice::Guidance(msg));
            }
            Err(e) => {
                warn!(error = %e, "registry refresh failed");
                self.files.clear();
                self.notice = Some(RegistryNotice::Failure(e.message().to_string()));
            }
        }
    }

    /// Upload a file and, on success, refresh immediately instead of waiting
    /// for the next poll tick. Returns the backend's confirmation message.
    pub async fn upload_and_refresh(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let message = self.client.upload_file(name, bytes).await?;
        self.refresh().await;
        Ok(message)
    }

    /// Delete a document from the backend.
    ///
    /// Success removes the entry locally; failure leaves the cached listing
    /// untouched and returns the error for the caller to surface.
    pub async fn delete_document(&mut self, uid: &str) -> Result<String, ApiError> {
        let message = self.client.delete_file(uid).await?;
        self.files.retain(|f| f.uid != uid);
        Ok(message)
    }
}

/// Drive periodic refreshes until the shutdown signal fires.
///
/// The first refresh happens immediately; subsequent refreshes run every
/// `poll_secs`. `on_refresh` observes the registry after each refresh.
/// Returns cleanly when `shutdown` changes or its sender is dropped, leaving
/// no recurring work behind.
pub async fn run_poller<F>(
    registry: &mut DocumentRegistry,
    poll_secs: u64,
    mut shutdown: watch::Receiver<bool>,
    mut on_refresh: F,
) where
    F: FnMut(&DocumentRegistry),
{
    let mut ticker = tokio::time::interval(Duration::from_secs(poll_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                registry.refresh().await;
                on_refresh(registry);
            }
            _ = shutdown.changed() => break,
        }
    }
}
