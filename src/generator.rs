//! Text generator boundary.
//!
//! The controller only sees [`TextGenerator`]: prompt in, raw text out.
//! [`ProviderGenerator`] adapts any [`LlmProvider`] and adds the per-call
//! deadline the retry loop itself does not impose.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::providers::{CompletionRequest, LlmProvider, Message, ProviderError, Role};

/// Failure of a single generator call. Always treated as transient.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The underlying provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The call exceeded its deadline.
    #[error("generator timed out after {secs}s")]
    Timeout {
        /// Deadline in seconds.
        secs: u64,
    },
    /// The generator returned nothing usable.
    #[error("generator returned empty output")]
    EmptyOutput,
}

/// Opaque, possibly slow, non-deterministic text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Continue `prompt` and return the raw text.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] on provider failure, timeout, or empty
    /// output.
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// [`TextGenerator`] backed by an [`LlmProvider`] with a per-call timeout.
pub struct ProviderGenerator {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
    max_tokens: u32,
}

impl ProviderGenerator {
    /// Wrap `provider`.
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            provider,
            timeout,
            max_tokens,
        }
    }

    /// Model identifier of the wrapped provider.
    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = CompletionRequest {
            messages: vec![Message {
                role: Role::User,
                content: prompt.to_owned(),
            }],
            system: None,
            max_tokens: Some(self.max_tokens),
            stop_sequences: vec![],
        };

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| GeneratorError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if response.text.trim().is_empty() {
            return Err(GeneratorError::EmptyOutput);
        }
        Ok(response.text)
    }
}
