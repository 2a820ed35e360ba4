//! Provider construction from `<provider>/<model>` specs.

use std::sync::Arc;

use crate::config::ModelsConfig;
use crate::credentials::{Credentials, OPENAI_API_KEY};

use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::LlmProvider;

/// Provider routing errors.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// Unsupported provider type in spec prefix.
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required API credential missing for selected provider.
    #[error("missing credential for provider '{provider}': {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing credential key.
        key: String,
    },
}

/// A model spec split into provider prefix and model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Provider prefix (`ollama`, `openai`).
    pub provider: String,
    /// Model name passed to the provider.
    pub model: String,
}

/// Split `spec` at the first `/`.
///
/// # Errors
///
/// Returns [`RouterError::InvalidModelSpec`] if either half is empty.
pub fn parse_model_spec(spec: &str) -> Result<ModelSpec, RouterError> {
    let mut split = spec.splitn(2, '/');
    let provider = split.next().unwrap_or_default().trim();
    let model = split.next().unwrap_or_default().trim();
    if provider.is_empty() || model.is_empty() {
        return Err(RouterError::InvalidModelSpec {
            spec: spec.to_owned(),
        });
    }
    Ok(ModelSpec {
        provider: provider.to_owned(),
        model: model.to_owned(),
    })
}

/// Instantiate the provider named by `spec`.
///
/// # Errors
///
/// Returns a [`RouterError`] for malformed specs, unknown providers, or a
/// missing API key.
pub fn build_provider(
    spec: &str,
    models: &ModelsConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, RouterError> {
    let parsed = parse_model_spec(spec)?;
    match parsed.provider.as_str() {
        "ollama" => Ok(Arc::new(
            OllamaProvider::new(spec.to_owned(), parsed.model).with_base_url(&models.ollama_url),
        )),
        "openai" => {
            let api_key = credentials
                .get(OPENAI_API_KEY)
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| RouterError::MissingCredential {
                    provider: parsed.provider.clone(),
                    key: OPENAI_API_KEY.to_owned(),
                })?;
            Ok(Arc::new(
                OpenAiProvider::new(spec.to_owned(), parsed.model, api_key.to_owned())
                    .with_endpoint(&models.openai_url),
            ))
        }
        _ => Err(RouterError::UnsupportedProvider {
            provider: parsed.provider,
        }),
    }
}
