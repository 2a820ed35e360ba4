//! Posting transport boundary.
//!
//! Posting lives outside the generation pipeline; the CLI hands accepted
//! posts to a [`Publisher`]. Only a dry-run implementation ships here.

use async_trait::async_trait;
use tracing::info;

/// Errors returned by publishers.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Refused to publish empty text.
    #[error("refusing to publish empty text")]
    EmptyText,
    /// Transport-specific failure.
    #[error("publish failed: {0}")]
    Transport(String),
}

/// Sends a finished post somewhere.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text`, returning the remote post id.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the post could not be delivered.
    async fn publish(&self, text: &str) -> Result<String, PublishError>;
}

/// Publisher that only logs. Returns a fresh UUID v4 as the post id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunPublisher;

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, text: &str) -> Result<String, PublishError> {
        if text.trim().is_empty() {
            return Err(PublishError::EmptyText);
        }
        let id = uuid::Uuid::new_v4().to_string();
        info!(post_id = %id, len = text.chars().count(), "dry-run publish");
        Ok(id)
    }
}
